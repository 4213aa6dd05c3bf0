//! Courier command-line client.
//!
//! Loads collections from the data directory and sends their requests,
//! recording history and script context between invocations.

mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = match Config::load(&cli).await {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(data_dir = %config.data_dir.display(), "configuration loaded");

    match commands::execute(cli.command, &config).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Log filter comes from `COURIER_LOG`, then `RUST_LOG`, defaulting to `info`.
/// Logs go to stderr so command output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("COURIER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
