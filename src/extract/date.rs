//! Certification date parsing.

use crate::error::RecordError;
use crate::extract::units::fold_full_width;
use chrono::NaiveDate;

const FORMATS: [&str; 5] = ["%Y%m%d", "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y年%m月%d日"];

/// Parse a catalog or command-line date such as `20200101`,
/// `2020-01-01`, `2020/1/1` or `2020年1月1日`.
///
/// A trailing time part (after `T` or a space) is ignored.
pub fn parse_date(text: &str) -> Result<NaiveDate, RecordError> {
    let folded: String = text.trim().chars().map(fold_full_width).collect();
    let day = folded
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or("");

    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
        .ok_or_else(|| RecordError::InvalidDate(text.to_string()))
}
