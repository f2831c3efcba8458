//! Report generation.
//!
//! This module renders the reader's result either as the JSON document
//! consumed by other tools or as a Markdown summary for people.

use crate::analysis::{FieldCounts, Stats};
use crate::models::{EnrichedRecord, Report, DATE};
use anyhow::Result;

/// Generate the JSON report: pretty-printed, two-space indent, UTF-8 verbatim.
pub fn generate_json_report(report: &Report) -> Result<String> {
    let mut output = serde_json::to_string_pretty(report)?;
    output.push('\n');
    Ok(output)
}

/// Generate a Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Giteki Report\n\n");

    if let Some(ref stat) = report.stat {
        output.push_str(&generate_summary_section(stat));
    }

    output.push_str(&generate_target_section(&report.target));

    output
}

/// Generate the statistics section.
fn generate_summary_section(stat: &Stats) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!(
        "| Total | Target | Others |\n|:---:|:---:|:---:|\n| {} | {} | {} |\n\n",
        stat.total_size, stat.target_size, stat.others_size
    ));

    for (name, counts) in &stat.fields {
        section.push_str(&generate_counts_table(name, counts));
    }

    section
}

fn generate_counts_table(name: &str, counts: &FieldCounts) -> String {
    let mut table = String::new();

    table.push_str(&format!("### {}\n\n", name));
    if counts.0.is_empty() {
        table.push_str("No records.\n\n");
        return table;
    }

    table.push_str("| Value | Count |\n");
    table.push_str("|:---|:---:|\n");
    for (value, count) in &counts.0 {
        table.push_str(&format!("| {} | {} |\n", escape_cell(value), count));
    }
    table.push('\n');

    table
}

/// Generate the target records table.
fn generate_target_section(target: &[EnrichedRecord]) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Target ({})\n\n", target.len()));
    if target.is_empty() {
        section.push_str("No records matched the criteria.\n\n");
        return section;
    }

    section.push_str("| Date | Name | Band (MHz) | Tx Power (mW) | Channel Width (kHz) |\n");
    section.push_str("|:---|:---|:---|---:|---:|\n");

    for record in target {
        let attrs = &record.attributes;
        let date = record
            .record
            .info_str(DATE)
            .map(str::to_string)
            .unwrap_or_else(|_| record.date.to_string());
        let width = if attrs.ch_width == 0.0 {
            "-".to_string()
        } else {
            format!("{}", attrs.ch_width / 1e3)
        };

        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            escape_cell(&date),
            escape_cell(record.name()),
            format_band(attrs.freq_min, attrs.freq_max),
            attrs.tx_power,
            width
        ));
    }
    section.push('\n');

    section
}

fn format_band(freq_min: f64, freq_max: f64) -> String {
    if freq_min < 0.0 {
        "-".to_string()
    } else if freq_min == freq_max {
        format!("{}", freq_min / 1e6)
    } else {
        format!("{}–{}", freq_min / 1e6, freq_max / 1e6)
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
