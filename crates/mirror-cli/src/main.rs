//! Folder Mirror CLI
//!
//! Keeps a replica folder identical to a source folder, re-synchronizing on
//! a fixed interval until told to stop.

mod cli;
mod control;
mod error;
mod logging;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use mirror_core::{CycleOutcome, SyncControl, SyncScheduler};
use tracing::{error, info};

use cli::Cli;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config()?;

    let _guard = logging::init(config.log_file.as_deref(), cli.verbose)?;

    let result = execute(&cli, config);
    if let Err(e) = &result {
        error!("Synchronization failed: {e}");
    }
    result
}

fn execute(cli: &Cli, config: mirror_core::SyncConfig) -> Result<()> {
    let config = config.validate()?;
    info!(
        source = %config.source.display(),
        replica = %config.replica.display(),
        interval_secs = config.interval_secs,
        compare_mode = ?config.compare_mode,
        "Starting folder synchronization"
    );

    let control = SyncControl::new();
    let mut scheduler = SyncScheduler::from_config(&config, Arc::clone(&control));

    if cli.once {
        return match scheduler.run_cycle() {
            CycleOutcome::Completed(report) if report.is_success() => Ok(()),
            CycleOutcome::Completed(report) => Err(CliError::user(format!(
                "{} item(s) failed to synchronize",
                report.failures.len()
            ))),
            CycleOutcome::Skipped { reason } => Err(CliError::user(reason)),
        };
    }

    control::install(Arc::clone(&control))?;
    println!(
        "{} Type {} + Enter to sync now, {} + Enter to quit.",
        "Mirroring.".green().bold(),
        "s".cyan(),
        "q".cyan()
    );

    scheduler.run();
    Ok(())
}
