//! giteki - MIC technical-conformity record collector and reader
//!
//! `fetch` pages through the giteki database and appends the records
//! to a JSON collection. `read` extracts band, power and channel width
//! from each record's description, selects the 920 MHz low-power
//! equipment and reports it together with optional statistics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, malformed record, HTTP failure, etc.)

mod analysis;
mod cli;
mod collector;
mod config;
mod error;
mod extract;
mod filter;
mod models;
mod reader;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::{Args, Command, FetchArgs, OutputFormat, ReadArgs};
use collector::{CatalogClient, CollectorSettings, Span};
use config::{Config, CONFIG_FILE};
use reader::ReadOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = args.command {
        return handle_init_config();
    }

    init_logging(&args);

    debug!("giteki v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = match args.command {
        Command::Fetch(ref fetch) => run_fetch(&args, fetch).await,
        Command::Read(ref read) => run_read(&args, read),
        Command::InitConfig => Ok(()),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .giteki.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    eprintln!("Created {} with default settings.", CONFIG_FILE);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout carries only report and collection data.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Count, and with `--retrieve` collect, the catalog records.
async fn run_fetch(args: &Args, fetch: &FetchArgs) -> Result<()> {
    let mut config = load_config(args)?;
    config.merge_fetch_args(fetch);

    let settings = CollectorSettings::from(&config.collector);
    let span = Span::parse(fetch.date_from.as_deref(), fetch.date_to.as_deref())
        .context("Invalid date span")?;
    let client = CatalogClient::new(&settings).context("Failed to create HTTP client")?;

    let count = client
        .count(&span)
        .await
        .context("Failed to get the number of records")?;

    if args.verbose || !fetch.retrieve {
        eprintln!("size={}", count);
    }
    if !fetch.retrieve {
        return Ok(());
    }

    let records = collector::collect_all(&client, &settings, &span, count, !args.quiet)
        .await
        .context("Retrieval aborted")?;
    info!("Retrieved {} records", records.len());

    match fetch.db_file {
        Some(ref path) => {
            store::merge_into(path, records)?;
        }
        None => {
            let document = store::to_document(&records)?;
            std::io::stdout()
                .write_all(document.as_bytes())
                .context("Failed to write records to stdout")?;
        }
    }

    Ok(())
}

/// Classify a stored collection and emit the report.
fn run_read(args: &Args, read: &ReadArgs) -> Result<()> {
    let mut config = load_config(args)?;
    config.merge_read_args(read);

    let options = ReadOptions {
        criteria: config.filter.criteria()?,
        show_others: read.show_others,
        verbose: args.verbose,
        show_stat: read.show_stat,
    };
    debug!("Criteria: {:?}", options.criteria);

    let values = store::load_collection(&read.db_file)?;
    let report = reader::read_collection(values, &options).context("Malformed record")?;

    let output = match read.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match read.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => {
            std::io::stdout()
                .write_all(output.as_bytes())
                .context("Failed to write report to stdout")?;
        }
    }

    Ok(())
}
