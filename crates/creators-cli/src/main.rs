//! creators - a command line client for the creators dashboard API.
//!
//! Lists, reads, creates and updates Profiles, Platforms, Users and
//! Identities with a dev-login session persisted between runs.

mod commands;
mod render;

use std::io;

use anyhow::Result;
use clap::Parser;
use creators_core::ApiError;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Cli;

/// When set, logs are also written to a daily file in this directory
const LOG_DIR_ENV: &str = "CREATORS_LOG_DIR";

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file writer when dropped.
fn init_tracing(verbose: bool) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let default_level = if verbose {
        "warn,creators=debug,creators_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "creators.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose);
    info!(command = ?cli.command, "creators starting");

    if let Err(e) = commands::run(cli).await {
        eprintln!("Error: {:#}", e);
        if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_unauthorized) {
            eprintln!("Your session is missing or expired. Run `creators login` and try again.");
        }
        std::process::exit(1);
    }

    Ok(())
}
