//! Command-line runner for one analytics report.
//!
//! Reads from a PostgREST-style backend (`STOCK_ANALYTICS_URL`,
//! `STOCK_ANALYTICS_KEY`) or, with `--duckdb`, from a local DuckDB mirror,
//! and prints the report as JSON.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use stock_analytics::{
    AnalyticsEngine, AnalyticsReport, Connection, EngineConfig, ReportRequest, RestStore, Result,
    TabularStore,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stock-analytics")]
#[command(about = "Inventory and sales reconciliation report")]
#[command(version)]
struct Cli {
    /// Engine config file (JSON). Defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read from a DuckDB database file instead of the REST backend
    #[arg(long)]
    duckdb: Option<PathBuf>,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-item analytics for a period
    Report {
        /// First day of the period (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day of the period (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Stock location (defaults to the configured location)
        #[arg(long)]
        location: Option<String>,

        /// New-product cutoff (YYYY-MM-DD); defaults to today minus the configured window
        #[arg(long)]
        cutoff: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::from_default_location()?,
    };

    let Commands::Report {
        start,
        end,
        location,
        cutoff,
    } = cli.command;

    let mut request = match cutoff {
        Some(cutoff) => ReportRequest::new(&start, &end, &cutoff),
        None => {
            let today: NaiveDate = chrono::Local::now().date_naive();
            ReportRequest::with_default_cutoff(&start, &end, today, config.new_product_window_days)
        }
    };
    if let Some(location) = location {
        request = request.location(&location);
    }

    let report = match &cli.duckdb {
        Some(path) => run_report(Connection::open(path)?, config, &request)?,
        None => {
            let url = std::env::var("STOCK_ANALYTICS_URL").map_err(|_| {
                stock_analytics::AnalyticsError::InvalidArgument(
                    "STOCK_ANALYTICS_URL is not set (or pass --duckdb)".into(),
                )
            })?;
            let mut builder = RestStore::builder(&url);
            if let Ok(key) = std::env::var("STOCK_ANALYTICS_KEY") {
                builder = builder.api_key(&key);
            }
            run_report(builder.build()?, config, &request)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_report<S: TabularStore>(store: S, config: EngineConfig, request: &ReportRequest) -> Result<AnalyticsReport> {
    let engine = AnalyticsEngine::builder(store).config(config).build();
    engine.report(request)
}
