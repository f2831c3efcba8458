//! Record statistics.
//!
//! This module counts occurrences of categorical field values and
//! orders the selections reported to the user.

use crate::error::RecordError;
use crate::filter::Partition;
use crate::models::{EnrichedRecord, STAT_KEYS};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Value counts for one field, most frequent first.
///
/// Equal counts keep the order in which the values were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCounts(pub Vec<(String, usize)>);

impl FieldCounts {
    /// Count values, then sort by descending count (stable).
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for value in values {
            let value = value.into();
            match index.get(&value) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(value.clone(), counts.len());
                    counts.push((value, 1));
                }
            }
        }

        counts.sort_by_key(|(_, count)| Reverse(*count));
        Self(counts)
    }

    #[allow(dead_code)] // Lookup helper for callers that need a single count
    pub fn get(&self, value: &str) -> Option<usize> {
        self.0.iter().find(|(v, _)| v == value).map(|(_, c)| *c)
    }
}

impl Serialize for FieldCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (value, count) in &self.0 {
            map.serialize_entry(value, count)?;
        }
        map.end()
    }
}

/// Partition sizes plus per-field value counts for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total_size: usize,
    pub target_size: usize,
    pub others_size: usize,
    /// One entry per name in [`STAT_KEYS`], in that order.
    pub fields: Vec<(&'static str, FieldCounts)>,
}

impl Stats {
    #[allow(dead_code)] // Lookup helper for callers that need a single field
    pub fn field(&self, name: &str) -> Option<&FieldCounts> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, c)| c)
    }
}

impl Serialize for Stats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.fields.len()))?;
        map.serialize_entry("total_size", &self.total_size)?;
        map.serialize_entry("target_size", &self.target_size)?;
        map.serialize_entry("others_size", &self.others_size)?;
        for (name, counts) in &self.fields {
            map.serialize_entry(name, counts)?;
        }
        map.end()
    }
}

/// Compute statistics over `selection`, reporting sizes from `partition`.
pub fn compute_stats(
    partition: &Partition,
    selection: &[EnrichedRecord],
) -> Result<Stats, RecordError> {
    let fields = STAT_KEYS
        .iter()
        .map(|&key| {
            let values = selection
                .iter()
                .map(|r| r.record.category(key))
                .collect::<Result<Vec<String>, RecordError>>()?;
            Ok::<_, RecordError>((key, FieldCounts::from_values(values)))
        })
        .collect::<Result<Vec<_>, RecordError>>()?;

    Ok(Stats {
        total_size: partition.total(),
        target_size: partition.target.len(),
        others_size: partition.others.len(),
        fields,
    })
}

/// Sort records by certification date, newest first (stable).
pub fn sort_by_date_desc(records: &mut [EnrichedRecord]) {
    records.sort_by_key(|r| Reverse(r.date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::enrich;
    use crate::models::Record;
    use serde_json::json;

    fn create_test_record(name: &str, organ: &str, date: &str) -> EnrichedRecord {
        let record = Record::try_from(json!({
            "gitekiInfo": {
                "name": name,
                "organName": organ,
                "radioEquipmentCode": "XY",
                "spuriousRules": "new",
                "techCode": "1",
                "elecWave": "920.6MHz 10mW",
                "date": date
            }
        }))
        .unwrap();
        enrich(record).unwrap()
    }

    #[test]
    fn test_field_counts_sorted_descending() {
        let values = ["A", "B", "A", "C", "B", "B", "A", "B", "B"];
        let counts = FieldCounts::from_values(values);
        assert_eq!(
            counts.0,
            vec![
                ("B".to_string(), 5),
                ("A".to_string(), 3),
                ("C".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_field_counts_ties_keep_first_seen_order() {
        let counts = FieldCounts::from_values(["x", "y", "z", "y", "x", "z"]);
        let order: Vec<&str> = counts.0.iter().map(|(v, _)| v.as_str()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_field_counts_serialize_in_order() {
        let counts = FieldCounts::from_values(["a", "b", "b"]);
        let text = serde_json::to_string(&counts).unwrap();
        assert_eq!(text, r#"{"b":2,"a":1}"#);
    }

    #[test]
    fn test_compute_stats() {
        let target = vec![
            create_test_record("AcmeCo", "TELEC", "20200101"),
            create_test_record("Beta", "TELEC", "20200102"),
            create_test_record("AcmeCo", "JQA", "20200103"),
        ];
        let partition = Partition {
            target: target.clone(),
            others: vec![create_test_record("Gamma", "JATE", "20200104")],
        };

        let stats = compute_stats(&partition, &partition.target).unwrap();
        assert_eq!(stats.total_size, 4);
        assert_eq!(stats.target_size, 3);
        assert_eq!(stats.others_size, 1);
        assert_eq!(stats.fields.len(), STAT_KEYS.len());
        assert_eq!(stats.field("name").unwrap().get("AcmeCo"), Some(2));
        assert_eq!(stats.field("organName").unwrap().0[0], ("TELEC".to_string(), 2));
        assert_eq!(stats.field("name").unwrap().get("Gamma"), None);

        let value = serde_json::to_value(&stats).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            vec![
                "total_size",
                "target_size",
                "others_size",
                "name",
                "organName",
                "radioEquipmentCode",
                "spuriousRules",
                "techCode"
            ]
        );
    }

    #[test]
    fn test_compute_stats_missing_field_fails() {
        let record = Record::try_from(json!({
            "gitekiInfo": { "name": "a", "elecWave": "", "date": "20200101" }
        }))
        .unwrap();
        let partition = Partition {
            target: vec![enrich(record).unwrap()],
            others: vec![],
        };
        assert!(matches!(
            compute_stats(&partition, &partition.target),
            Err(RecordError::MissingField { .. })
        ));
    }

    #[test]
    fn test_sort_by_date_desc() {
        let mut records = vec![
            create_test_record("old", "o", "20190101"),
            create_test_record("new", "o", "20210101"),
            create_test_record("mid", "o", "20200101"),
        ];
        sort_by_date_desc(&mut records);
        let names: Vec<&str> = records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }
}
