//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.giteki.toml` files.

use crate::cli::{FetchArgs, ReadArgs};
use crate::extract::{parse_ch_width_setting, parse_date};
use crate::filter::Criteria;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".giteki.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Collector settings.
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Reader filter settings.
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Catalog retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Base URL of the giteki API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds to wait between pages.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,

    /// `DC` chunk-size index (4=50, 5=100, 6=500, 7=1000).
    #[serde(default = "default_chunk_index")]
    pub chunk_index: u8,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            interval_seconds: default_interval(),
            chunk_index: default_chunk_index(),
            timeout_seconds: default_timeout(),
            accept_invalid_certs: false,
        }
    }
}

fn default_base_url() -> String {
    "https://www.tele.soumu.go.jp/giteki".to_string()
}

fn default_interval() -> u64 {
    60
}

fn default_chunk_index() -> u8 {
    6
}

fn default_timeout() -> u64 {
    60
}

/// Classification criteria for the reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Vendor name substring.
    #[serde(default)]
    pub vendor: Option<String>,

    /// First certification date included.
    #[serde(default = "default_date_from")]
    pub date_from: String,

    /// Last certification date included.
    #[serde(default = "default_date_to")]
    pub date_to: String,

    /// Maximum Tx power in mW (inclusive).
    #[serde(default = "default_max_tx_power")]
    pub max_tx_power: f64,

    /// Minimum Tx power in mW (exclusive).
    #[serde(default = "default_min_tx_power")]
    pub min_tx_power: f64,

    /// Exact channel width, e.g. "200kHz".
    #[serde(default)]
    pub ch_width: Option<String>,

    /// Only take records stating a channel width.
    #[serde(default)]
    pub specific_ch_width: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            vendor: None,
            date_from: default_date_from(),
            date_to: default_date_to(),
            max_tx_power: default_max_tx_power(),
            min_tx_power: default_min_tx_power(),
            ch_width: None,
            specific_ch_width: false,
        }
    }
}

fn default_date_from() -> String {
    "19700101".to_string()
}

fn default_date_to() -> String {
    "29990101".to_string()
}

fn default_max_tx_power() -> f64 {
    20.0
}

fn default_min_tx_power() -> f64 {
    1.0
}

impl FilterConfig {
    /// Build classification criteria, parsing dates and the channel width.
    pub fn criteria(&self) -> Result<Criteria> {
        let date_from = parse_date(&self.date_from).context("Invalid date-from")?;
        let date_to = parse_date(&self.date_to).context("Invalid date-to")?;

        let ch_width = match self.ch_width {
            Some(ref text) => Some(
                parse_ch_width_setting(text)
                    .ok_or_else(|| anyhow!("Invalid channel width: {}", text))?,
            ),
            None => None,
        };

        Ok(Criteria {
            vendor: self.vendor.clone(),
            date_from,
            date_to,
            max_tx_power: self.max_tx_power,
            min_tx_power: self.min_tx_power,
            ch_width,
            require_ch_width: self.specific_ch_width,
        })
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge `read` arguments; CLI values take precedence over the file.
    pub fn merge_read_args(&mut self, args: &ReadArgs) {
        if let Some(ref name) = args.name {
            self.filter.vendor = Some(name.clone());
        }
        if let Some(ref date_from) = args.date_from {
            self.filter.date_from = date_from.clone();
        }
        if let Some(ref date_to) = args.date_to {
            self.filter.date_to = date_to.clone();
        }
        if let Some(max) = args.max_tx_power {
            self.filter.max_tx_power = max;
        }
        if let Some(min) = args.min_tx_power {
            self.filter.min_tx_power = min;
        }
        if let Some(ref width) = args.ch_width {
            self.filter.ch_width = Some(width.clone());
        }

        // Flags always override
        if args.specific_ch_width {
            self.filter.specific_ch_width = true;
        }
    }

    /// Merge `fetch` arguments; CLI values take precedence over the file.
    pub fn merge_fetch_args(&mut self, args: &FetchArgs) {
        if let Some(ref url) = args.base_url {
            self.collector.base_url = url.clone();
        }
        if let Some(interval) = args.interval {
            self.collector.interval_seconds = interval;
        }
        if let Some(index) = args.chunk_index {
            self.collector.chunk_index = index;
        }
        if let Some(timeout) = args.timeout {
            self.collector.timeout_seconds = timeout;
        }
        if args.insecure {
            self.collector.accept_invalid_certs = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
