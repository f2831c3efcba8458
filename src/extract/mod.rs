//! Field extraction from the free-text `elecWave` description.
//!
//! The description is a human-written list such as
//! `920.6〜928.0MHz 20mW 200kHz間隔`. Extraction turns it into the
//! numeric [`Attributes`] used by the classifier. Text that matches no
//! pattern is not an error; it yields the sentinel values.

pub mod date;
pub mod patterns;
pub mod units;

use crate::error::RecordError;
use crate::models::{Attributes, EnrichedRecord, Record, DATE};
use patterns::{
    BandShape, PowerUnit, BAND_PATTERNS, CH_WIDTH_PATTERN, CH_WIDTH_SETTING, POWER_PATTERNS,
};
use regex::Captures;
use serde_json::Value;
use tracing::trace;
use units::{multiplier, parse_number};

pub use date::parse_date;

/// Derive all attributes from a description.
pub fn extract(elec_wave: &str) -> Attributes {
    let (freq_min, freq_max) = parse_band(elec_wave);
    Attributes {
        freq_min,
        freq_max,
        tx_power: parse_tx_power(elec_wave),
        ch_width: parse_ch_width(elec_wave),
    }
}

/// Parse the band as `(freq_min, freq_max)` in Hz, `(-1, -1)` if unknown.
///
/// A match whose magnitude is below the largest one accepted so far is
/// taken to be a channel-width annotation and skipped. Texts listing
/// bands in decreasing magnitude are misread by this; that is accepted.
pub fn parse_band(text: &str) -> (f64, f64) {
    let mut accepted = 0.0_f64;
    let mut freqs: Vec<f64> = Vec::new();

    for pattern in BAND_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let unit = multiplier(caps.name("unit").map(|m| m.as_str()));
            if unit < accepted {
                trace!("Skipping '{}' as a channel width", &caps[0]);
                continue;
            }

            let endpoints = match pattern.shape {
                BandShape::Range => vec![number(&caps, "lo"), number(&caps, "hi")],
                BandShape::Point => vec![number(&caps, "lo")],
            };
            let Some(endpoints) = endpoints.into_iter().collect::<Option<Vec<f64>>>() else {
                continue;
            };

            accepted = unit;
            freqs.extend(endpoints.into_iter().map(|f| f * unit));
        }
    }

    let freq_min = freqs.iter().copied().reduce(f64::min);
    let freq_max = freqs.iter().copied().reduce(f64::max);
    match (freq_min, freq_max) {
        (Some(min), Some(max)) => (min, max),
        _ => (-1.0, -1.0),
    }
}

/// Parse the transmit power in mW from the first power expression, or 0.
///
/// Watts (and milliwatts) take priority over dBm. Within one unit the
/// first match whose number parses wins.
pub fn parse_tx_power(text: &str) -> f64 {
    for pattern in POWER_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(value) = number(&caps, "val") else {
                continue;
            };
            return match pattern.unit {
                PowerUnit::Watts if caps.name("milli").map_or(true, |m| m.is_empty()) => {
                    value * 1000.0
                }
                PowerUnit::Watts => value,
                PowerUnit::DecibelMilliwatts => 10f64.powf(value / 10.0),
            };
        }
    }
    0.0
}

/// Parse the channel spacing in Hz from the first `…Hz間隔` expression, or 0.
pub fn parse_ch_width(text: &str) -> f64 {
    CH_WIDTH_PATTERN
        .captures_iter(text)
        .find_map(|caps| {
            let unit = multiplier(caps.name("unit").map(|m| m.as_str()));
            number(&caps, "val").map(|v| v * unit)
        })
        .unwrap_or(0.0)
}

/// Parse a configured channel width (`200kHz`, `200k`, `200000`) into Hz.
pub fn parse_ch_width_setting(text: &str) -> Option<f64> {
    let caps = CH_WIDTH_SETTING.captures(text)?;
    let unit = multiplier(caps.name("unit").map(|m| m.as_str()));
    number(&caps, "val").map(|v| v * unit)
}

/// Attach derived attributes and the parsed date to a record.
///
/// Derived keys left over from an earlier enrichment are dropped first,
/// so enriching an already-enriched record gives the same result.
pub fn enrich(mut record: Record) -> Result<EnrichedRecord, RecordError> {
    for key in Attributes::KEYS {
        record.0.shift_remove(key);
    }

    let attributes = extract(record.elec_wave()?);
    let date = parse_date(record.info_str(DATE)?)?;
    record.name()?;

    Ok(EnrichedRecord {
        record,
        attributes,
        date,
    })
}

/// Enrich a whole collection, stopping at the first malformed record.
pub fn enrich_all(values: Vec<Value>) -> Result<Vec<EnrichedRecord>, RecordError> {
    values
        .into_iter()
        .map(|value| Record::try_from(value).and_then(enrich))
        .collect()
}

fn number(caps: &Captures<'_>, group: &str) -> Option<f64> {
    caps.name(group).and_then(|m| parse_number(m.as_str()))
}
