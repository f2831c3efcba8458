//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Options left unset fall back to the
//! configuration file, then to built-in defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// giteki - collect and read MIC technical-conformity records
///
/// Retrieve certification records from the giteki database and pick
/// out the 920 MHz low-power equipment among them.
///
/// Examples:
///   giteki fetch --date-from 20200101 --retrieve db.json
///   giteki read db.json --name Acme --max-tx-power 20
///   giteki -v read db.json --show-others
///   cat db.json | giteki read - --format markdown
///   giteki init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose mode
    ///
    /// Debug logging; for `read`, also keeps every record field and
    /// includes the statistics section.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress bar)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .giteki.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Retrieve records from the giteki database
    Fetch(FetchArgs),
    /// Filter a stored collection and report the target records
    Read(ReadArgs),
    /// Generate a default .giteki.toml configuration file
    InitConfig,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Collection file to merge the retrieved records into (stdout if omitted)
    #[arg(value_name = "DB_FILE")]
    pub db_file: Option<PathBuf>,

    /// Start of the certification date span (e.g. 20120101)
    #[arg(long, value_name = "DATE")]
    pub date_from: Option<String>,

    /// End of the certification date span (e.g. 20140101)
    #[arg(long, value_name = "DATE")]
    pub date_to: Option<String>,

    /// Seconds to wait between pages
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,

    /// Chunk size index: 4=50, 5=100, 6=500, 7=1000 records per page
    #[arg(long = "dc", value_name = "INDEX", value_parser = clap::value_parser!(u8).range(4..=7))]
    pub chunk_index: Option<u8>,

    /// Retrieve the records; without this only the count is shown
    #[arg(long)]
    pub retrieve: bool,

    /// Base URL of the giteki API
    #[arg(long, value_name = "URL", env = "GITEKI_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates from the API host
    #[arg(long)]
    pub insecure: bool,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReadArgs {
    /// Collection file in JSON, or `-` for stdin
    #[arg(value_name = "DB_FILE")]
    pub db_file: PathBuf,

    /// Vendor name substring to match
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// First certification date to include [default: 19700101]
    #[arg(long, value_name = "DATE")]
    pub date_from: Option<String>,

    /// Last certification date to include [default: 29990101]
    #[arg(long, value_name = "DATE")]
    pub date_to: Option<String>,

    /// Maximum Tx power in mW, inclusive [default: 20.0]
    #[arg(long, value_name = "MW")]
    pub max_tx_power: Option<f64>,

    /// Minimum Tx power in mW, exclusive [default: 1.0]
    #[arg(long, value_name = "MW")]
    pub min_tx_power: Option<f64>,

    /// Channel width to match exactly (e.g. 200kHz, 200k, 200000)
    #[arg(long, value_name = "WIDTH")]
    pub ch_width: Option<String>,

    /// Only take records that state a channel width
    #[arg(long)]
    pub specific_ch_width: bool,

    /// Compute statistics over the other records instead of the target
    #[arg(long)]
    pub show_others: bool,

    /// Include the statistics section
    #[arg(long)]
    pub show_stat: bool,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON document (default)
    #[default]
    Json,
    /// Markdown summary
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match self.command {
            Command::Read(ref read) => {
                if read.db_file.as_os_str().is_empty() {
                    return Err("Collection path must not be empty".to_string());
                }
            }
            Command::Fetch(ref fetch) => {
                if let Some(ref url) = fetch.base_url {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        return Err("Base URL must start with 'http://' or 'https://'".to_string());
                    }
                }
                if fetch.timeout == Some(0) {
                    return Err("Timeout must be at least 1 second".to_string());
                }
            }
            Command::InitConfig => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
