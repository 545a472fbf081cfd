//! Timeframe Archivist CLI
//!
//! Archives the videos of a recorded event from a phone to local, S3 and Nextcloud storage.

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use timeframe_archivist::cli::{args::Cli, commands::archive};
use timeframe_archivist::models::config::load_config;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.log_level.as_str());

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "[ERROR]".bold().red(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    archive::run_archive(&config, &cli.events)
        .await
        .with_context(|| format!("Archive with events from {} failed", cli.events.display()))?;

    println!();
    println!("{}", "[OK] Archive complete".bold().green());
    Ok(())
}

/// Initialize the logging system.
fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::new(format!("timeframe_archivist={}", level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
