//! The read pass: enrich, classify, aggregate, sanitize.

use crate::analysis::{compute_stats, sort_by_date_desc};
use crate::error::RecordError;
use crate::extract::enrich_all;
use crate::filter::{partition, Criteria};
use crate::models::Report;
use serde_json::Value;
use tracing::{debug, info};

/// Options for one read pass.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub criteria: Criteria,
    /// Compute statistics over the others set instead of the target set.
    pub show_others: bool,
    /// Keep every field and include statistics.
    pub verbose: bool,
    /// Include statistics without disabling sanitization.
    pub show_stat: bool,
}

impl ReadOptions {
    pub fn wants_stats(&self) -> bool {
        self.verbose || self.show_stat
    }
}

/// Run the whole read pass over a raw collection.
pub fn read_collection(values: Vec<Value>, options: &ReadOptions) -> Result<Report, RecordError> {
    let records = enrich_all(values)?;
    debug!("Enriched {} records", records.len());

    let mut split = partition(records, &options.criteria);
    info!(
        "Classified {} records: {} target, {} others",
        split.total(),
        split.target.len(),
        split.others.len()
    );

    let stat = if options.wants_stats() {
        let selection = if options.show_others {
            &split.others
        } else {
            &split.target
        };
        Some(compute_stats(&split, selection)?)
    } else {
        None
    };

    sort_by_date_desc(&mut split.target);

    if !options.verbose {
        for record in &mut split.target {
            record.record.sanitize();
        }
    }

    Ok(Report {
        target: split.target,
        stat,
    })
}
