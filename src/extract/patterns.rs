//! Pattern table for the `elecWave` description grammar.
//!
//! Each entry pairs a regular expression with what its captures mean.
//! Magnitude letters and `Hz` come in ASCII and full-width forms.

use regex::Regex;
use std::sync::LazyLock;

const NUM: &str = r"[\d\.．]+";
const MAGNITUDE: &str = "[kｋMＭGＧ]";
const HERTZ: &str = "[HＨ][zｚ]";

/// Shape of a band expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandShape {
    /// `920.6〜928.0MHz`: captures `lo`, `hi`, `unit`.
    Range,
    /// `920.6MHz`: captures `lo`, `unit`.
    Point,
}

/// Unit semantics of a power expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUnit {
    /// `1W` or `20mW`: captures `val` and an optional `milli` prefix.
    Watts,
    /// `13dBm`: captures `val`.
    DecibelMilliwatts,
}

pub struct BandPattern {
    pub shape: BandShape,
    pub regex: Regex,
}

pub struct PowerPattern {
    pub unit: PowerUnit,
    pub regex: Regex,
}

fn compile(pattern: &str) -> Regex {
    // Patterns are fixed at build time; a failure here is a programming error.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

/// Band patterns in scan order: every range match is visited before any point match.
pub static BAND_PATTERNS: LazyLock<[BandPattern; 2]> = LazyLock::new(|| {
    [
        BandPattern {
            shape: BandShape::Range,
            regex: compile(&format!(
                "(?P<lo>{NUM})〜(?P<hi>{NUM})(?P<unit>{MAGNITUDE}){HERTZ}"
            )),
        },
        BandPattern {
            shape: BandShape::Point,
            regex: compile(&format!("(?P<lo>{NUM})(?P<unit>{MAGNITUDE}){HERTZ}")),
        },
    ]
});

/// Power patterns in priority order; the first pattern with any match wins.
pub static POWER_PATTERNS: LazyLock<[PowerPattern; 2]> = LazyLock::new(|| {
    [
        PowerPattern {
            unit: PowerUnit::Watts,
            regex: compile(&format!("(?P<val>{NUM})(?P<milli>[mｍ]?)[WＷ]")),
        },
        PowerPattern {
            unit: PowerUnit::DecibelMilliwatts,
            regex: compile(&format!("(?P<val>{NUM})[dｄ][BＢ][mｍ]")),
        },
    ]
});

/// Channel spacing: `200kHz間隔`.
pub static CH_WIDTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!("(?P<val>{NUM})(?P<unit>{MAGNITUDE}){HERTZ}間隔"))
});

/// A channel width given on the command line or in the config file:
/// `200kHz`, `200k`, `200000`, with optional whitespace before the unit.
pub static CH_WIDTH_SETTING: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"^\s*(?P<val>{NUM})\s*(?P<unit>{MAGNITUDE})?(?:{HERTZ})?\s*$"
    ))
});
