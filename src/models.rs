//! Data models for certification records.
//!
//! Raw records are kept as opaque JSON objects so that fields the
//! catalog adds later survive a fetch/read cycle untouched. Only the
//! handful of fields used for filtering get typed accessors.

use crate::analysis::Stats;
use crate::error::RecordError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key of the nested object holding the certification details.
pub const INFO_KEY: &str = "gitekiInfo";

/// Free-text description of frequencies and output power.
pub const ELEC_WAVE: &str = "elecWave";

/// Vendor name.
pub const NAME: &str = "name";

/// Certification date.
pub const DATE: &str = "date";

/// Categorical fields counted in the statistics section.
pub const STAT_KEYS: [&str; 5] = [
    "name",
    "organName",
    "radioEquipmentCode",
    "spuriousRules",
    "techCode",
];

/// Fields dropped from `gitekiInfo` when the output is sanitized.
pub const SANITIZED_KEYS: [&str; 11] = [
    "attachmentFileCntForCd1",
    "attachmentFileCntForCd2",
    "attachmentFileKey",
    "attachmentFileName",
    "bodySar",
    "no",
    "note",
    "organName",
    "radioEquipmentCode",
    "spuriousRules",
    "techCode",
];

/// A record exactly as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    /// The nested `gitekiInfo` object.
    pub fn info(&self) -> Result<&Map<String, Value>, RecordError> {
        self.0
            .get(INFO_KEY)
            .and_then(Value::as_object)
            .ok_or(RecordError::MissingInfo(INFO_KEY))
    }

    /// A string field of `gitekiInfo`.
    pub fn info_str(&self, field: &str) -> Result<&str, RecordError> {
        match self.info()?.get(field) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(RecordError::NotAString {
                field: field.to_string(),
            }),
            None => Err(RecordError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    /// The value of a categorical field, as used for statistics.
    ///
    /// Non-string values are rendered as their JSON text.
    pub fn category(&self, field: &str) -> Result<String, RecordError> {
        match self.info()?.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(RecordError::MissingField {
                field: field.to_string(),
            }),
        }
    }

    pub fn elec_wave(&self) -> Result<&str, RecordError> {
        self.info_str(ELEC_WAVE)
    }

    pub fn name(&self) -> Result<&str, RecordError> {
        self.info_str(NAME)
    }

    /// Remove the bulky and classification-only fields from `gitekiInfo`.
    pub fn sanitize(&mut self) {
        if let Some(Value::Object(info)) = self.0.get_mut(INFO_KEY) {
            for key in SANITIZED_KEYS {
                info.shift_remove(key);
            }
        }
    }
}

impl TryFrom<Value> for Record {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(RecordError::NotAnObject),
        }
    }
}

/// Numeric attributes derived from the `elecWave` description.
///
/// Sentinels: `-1` for an unknown frequency, `0` for an unknown power or
/// channel width. A genuine zero cannot be told apart from "absent"; the
/// exclusive lower power bound depends on that.
///
/// Sentinels serialize as the integers `-1` and `0`; measured values
/// serialize as floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// Lowest frequency in Hz.
    #[serde(serialize_with = "serialize_sentinel")]
    pub freq_min: f64,
    /// Highest frequency in Hz.
    #[serde(serialize_with = "serialize_sentinel")]
    pub freq_max: f64,
    /// Transmit power in mW.
    #[serde(serialize_with = "serialize_sentinel")]
    pub tx_power: f64,
    /// Channel spacing in Hz.
    #[serde(serialize_with = "serialize_sentinel")]
    pub ch_width: f64,
}

fn serialize_sentinel<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if *value == -1.0 {
        serializer.serialize_i64(-1)
    } else if *value == 0.0 {
        serializer.serialize_i64(0)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl Attributes {
    /// Top-level keys the attributes occupy in a serialized record.
    pub const KEYS: [&'static str; 4] = ["freq_min", "freq_max", "tx_power", "ch_width"];
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            freq_min: -1.0,
            freq_max: -1.0,
            tx_power: 0.0,
            ch_width: 0.0,
        }
    }
}

/// A record together with its derived attributes and parsed date.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: Record,
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(skip)]
    pub date: NaiveDate,
}

impl EnrichedRecord {
    pub fn name(&self) -> &str {
        // Presence is checked during enrichment; fall back to no match.
        self.record.name().unwrap_or("")
    }
}

/// The reader's output document.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Records in the target set, newest first.
    pub target: Vec<EnrichedRecord>,
    /// Statistics, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stat: Option<Stats>,
}
