//! Classification of enriched records into target and others.
//!
//! The target set is equipment in the 920 MHz low-power band whose
//! power, channel width, vendor and certification date match the
//! configured criteria.

use crate::models::EnrichedRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Lower edge of the reference band in Hz (inclusive).
pub const BAND_LOWER_HZ: f64 = 920_600_000.0;

/// Upper edge of the reference band in Hz (inclusive).
pub const BAND_UPPER_HZ: f64 = 928_000_000.0;

/// Criteria a record must meet to be part of the target set.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    /// Substring the vendor name must contain (case-sensitive).
    pub vendor: Option<String>,
    /// First certification date accepted (inclusive).
    pub date_from: NaiveDate,
    /// Last certification date accepted (inclusive).
    pub date_to: NaiveDate,
    /// Maximum transmit power in mW (inclusive).
    pub max_tx_power: f64,
    /// Minimum transmit power in mW (exclusive).
    pub min_tx_power: f64,
    /// Exact channel width in Hz.
    pub ch_width: Option<f64>,
    /// Reject records without a stated channel width.
    pub require_ch_width: bool,
}

impl Default for Criteria {
    fn default() -> Self {
        Self {
            vendor: None,
            date_from: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN),
            date_to: NaiveDate::from_ymd_opt(2999, 1, 1).unwrap_or(NaiveDate::MAX),
            max_tx_power: 20.0,
            min_tx_power: 1.0,
            ch_width: None,
            require_ch_width: false,
        }
    }
}

/// The first criterion a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rejection {
    Vendor,
    Period,
    Band,
    TxPower,
    NoChannelWidth,
    ChannelWidth,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Vendor => write!(f, "vendor"),
            Rejection::Period => write!(f, "period"),
            Rejection::Band => write!(f, "band"),
            Rejection::TxPower => write!(f, "tx power"),
            Rejection::NoChannelWidth => write!(f, "no channel width"),
            Rejection::ChannelWidth => write!(f, "channel width"),
        }
    }
}

impl Criteria {
    /// Check a record against every criterion, in order.
    pub fn check(&self, record: &EnrichedRecord) -> Result<(), Rejection> {
        let attrs = &record.attributes;

        if let Some(ref vendor) = self.vendor {
            if !record.name().contains(vendor.as_str()) {
                return Err(Rejection::Vendor);
            }
        }

        if record.date < self.date_from || record.date > self.date_to {
            return Err(Rejection::Period);
        }

        // The -1 sentinel for an unknown band fails the lower edge.
        if attrs.freq_min < BAND_LOWER_HZ || attrs.freq_max > BAND_UPPER_HZ {
            return Err(Rejection::Band);
        }

        // The 0 sentinel for unknown power fails any non-negative lower bound.
        if attrs.tx_power > self.max_tx_power || attrs.tx_power <= self.min_tx_power {
            return Err(Rejection::TxPower);
        }

        if self.require_ch_width && attrs.ch_width == 0.0 {
            return Err(Rejection::NoChannelWidth);
        }

        if let Some(width) = self.ch_width {
            if attrs.ch_width != width {
                return Err(Rejection::ChannelWidth);
            }
        }

        Ok(())
    }
}

/// Records split into those meeting the criteria and the rest.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub target: Vec<EnrichedRecord>,
    pub others: Vec<EnrichedRecord>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.target.len() + self.others.len()
    }
}

/// Split records into target and others, keeping input order in each.
pub fn partition(records: Vec<EnrichedRecord>, criteria: &Criteria) -> Partition {
    let mut result = Partition::default();
    let mut reasons: BTreeMap<Rejection, usize> = BTreeMap::new();

    for record in records {
        match criteria.check(&record) {
            Ok(()) => result.target.push(record),
            Err(reason) => {
                *reasons.entry(reason).or_default() += 1;
                result.others.push(record);
            }
        }
    }

    for (reason, count) in &reasons {
        debug!("Rejected by {}: {}", reason, count);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::enrich;
    use crate::models::Record;
    use serde_json::json;

    fn make_record(name: &str, elec_wave: &str, date: &str) -> EnrichedRecord {
        let record = Record::try_from(json!({
            "gitekiInfo": { "name": name, "elecWave": elec_wave, "date": date }
        }))
        .unwrap();
        enrich(record).unwrap()
    }

    fn in_band(power: &str) -> EnrichedRecord {
        make_record("AcmeCo", &format!("920.6〜928.0MHz {power}"), "20200101")
    }

    #[test]
    fn test_default_criteria_accept_low_power() {
        let criteria = Criteria::default();
        assert!(criteria.check(&in_band("20mW")).is_ok());
        assert!(criteria.check(&in_band("1.5mW")).is_ok());
    }

    #[test]
    fn test_power_bounds() {
        let criteria = Criteria {
            max_tx_power: 20.0,
            min_tx_power: 1.0,
            ..Criteria::default()
        };
        // Upper bound inclusive, lower bound exclusive.
        assert_eq!(criteria.check(&in_band("20mW")), Ok(()));
        assert_eq!(criteria.check(&in_band("1mW")), Err(Rejection::TxPower));
        assert_eq!(criteria.check(&in_band("21mW")), Err(Rejection::TxPower));
        // No power information.
        assert_eq!(criteria.check(&in_band("")), Err(Rejection::TxPower));
    }

    #[test]
    fn test_default_criteria_exclude_one_watt() {
        let record = in_band("1W");
        assert_eq!(
            Criteria::default().check(&record),
            Err(Rejection::TxPower)
        );

        let criteria = Criteria {
            max_tx_power: 2000.0,
            ..Criteria::default()
        };
        assert!(criteria.check(&record).is_ok());
    }

    #[test]
    fn test_band_edges() {
        let criteria = Criteria::default();
        let inside = make_record("a", "920.6MHz 10mW", "20200101");
        let below = make_record("a", "920.5〜928.0MHz 10mW", "20200101");
        let above = make_record("a", "920.6〜928.1MHz 10mW", "20200101");
        let unknown = make_record("a", "10mW", "20200101");

        assert!(criteria.check(&inside).is_ok());
        assert_eq!(criteria.check(&below), Err(Rejection::Band));
        assert_eq!(criteria.check(&above), Err(Rejection::Band));
        assert_eq!(criteria.check(&unknown), Err(Rejection::Band));
    }

    #[test]
    fn test_vendor_substring_is_case_sensitive() {
        let record = in_band("10mW");
        let matching = Criteria {
            vendor: Some("Acme".to_string()),
            ..Criteria::default()
        };
        let other_case = Criteria {
            vendor: Some("acme".to_string()),
            ..Criteria::default()
        };
        assert!(matching.check(&record).is_ok());
        assert_eq!(other_case.check(&record), Err(Rejection::Vendor));
    }

    #[test]
    fn test_period_is_inclusive() {
        let record = in_band("10mW");
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let exact = Criteria {
            date_from: day,
            date_to: day,
            ..Criteria::default()
        };
        let later = Criteria {
            date_from: day.succ_opt().unwrap(),
            ..Criteria::default()
        };
        assert!(exact.check(&record).is_ok());
        assert_eq!(later.check(&record), Err(Rejection::Period));
    }

    #[test]
    fn test_channel_width_criteria() {
        let with_width = in_band("10mW 200kHz間隔");
        let without_width = in_band("10mW");

        let required = Criteria {
            require_ch_width: true,
            ..Criteria::default()
        };
        assert!(required.check(&with_width).is_ok());
        assert_eq!(
            required.check(&without_width),
            Err(Rejection::NoChannelWidth)
        );

        let exact = Criteria {
            ch_width: Some(200_000.0),
            ..Criteria::default()
        };
        assert!(exact.check(&with_width).is_ok());
        assert_eq!(exact.check(&without_width), Err(Rejection::ChannelWidth));

        let other = Criteria {
            ch_width: Some(400_000.0),
            ..Criteria::default()
        };
        assert_eq!(other.check(&with_width), Err(Rejection::ChannelWidth));
    }

    #[test]
    fn test_partition_is_total_and_disjoint() {
        let records = vec![
            in_band("10mW"),
            in_band("1W"),
            make_record("Other", "2.4GHz 10mW", "20200101"),
            in_band("5mW"),
        ];
        let criteria = Criteria::default();
        let split = partition(records, &criteria);

        assert_eq!(split.total(), 4);
        assert_eq!(split.target.len(), 2);
        assert_eq!(split.others.len(), 2);
        assert!(split.target.iter().all(|r| criteria.check(r).is_ok()));
        assert!(split.others.iter().all(|r| criteria.check(r).is_err()));
    }

    #[test]
    fn test_inverted_power_window_selects_nothing() {
        let criteria = Criteria {
            max_tx_power: 1.0,
            min_tx_power: 20.0,
            ..Criteria::default()
        };
        let split = partition(vec![in_band("10mW"), in_band("1mW")], &criteria);
        assert!(split.target.is_empty());
        assert_eq!(split.others.len(), 2);
    }
}
