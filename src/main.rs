//! stormtrack - Storm-Track Exploratory Analysis
//!
//! Loads a storm-track CSV, writes summary.json and renders the report charts.
//!
//! Exit codes:
//!   0 - Success (individual sections may still have been skipped)
//!   1 - Fatal error (unreadable data, bad configuration, unwritable output)

mod cli;

use anyhow::{Context, Result};
use cli::Args;
use std::path::Path;
use stormtrack::config::CONFIG_FILE_NAME;
use stormtrack::Config;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let args = Args::parse_args();

    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    init_logging(&args);
    info!("stormtrack v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("Analysis failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: write a default .stormtrack.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        anyhow::bail!("{} already exists; remove it or edit it manually", CONFIG_FILE_NAME);
    }
    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Logging was already initialized");
    }
}

fn run(args: &Args) -> Result<()> {
    let input = args
        .input
        .as_deref()
        .context("--input is required")?;

    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    args.merge_into(&mut config);
    config.validate().context("Invalid configuration")?;
    debug!("Configuration: {:?}", config);

    let report = stormtrack::run(input, &config)
        .with_context(|| format!("Failed to analyze {}", input.display()))?;

    if report.skipped_charts > 0 && config.charts.enabled {
        warn!("{} chart(s) were skipped, see errors above", report.skipped_charts);
    }
    println!(
        "Analyzed {} observations: {} chart(s), summary at {}",
        report.rows,
        report.charts.len(),
        report.summary_path.display()
    );
    Ok(())
}
