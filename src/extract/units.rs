//! SI magnitudes and numeric text normalization.

/// Multiplier for a captured magnitude letter; `None` (no letter) is 1.
///
/// Unknown letters also map to 1; the patterns only ever capture the
/// six letters listed here.
pub fn multiplier(unit: Option<&str>) -> f64 {
    match unit {
        Some("k" | "ｋ") => 1e3,
        Some("M" | "Ｍ") => 1e6,
        Some("G" | "Ｇ") => 1e9,
        _ => 1.0,
    }
}

/// Parse a number matched by `[\d.．]+`.
///
/// Full-width digits and the full-width full stop are folded to ASCII
/// first. Returns `None` for text such as `1.2.3` or a lone `.`.
pub fn parse_number(text: &str) -> Option<f64> {
    let ascii: String = text.chars().map(fold_full_width).collect();
    ascii.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Map a full-width digit or full stop (U+FF10..U+FF19, U+FF0E) to ASCII.
pub fn fold_full_width(c: char) -> char {
    match c {
        '\u{FF10}'..='\u{FF19}' => {
            char::from_u32(c as u32 - 0xFF10 + '0' as u32).unwrap_or(c)
        }
        '\u{FF0E}' => '.',
        _ => c,
    }
}
