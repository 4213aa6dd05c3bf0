//! Runtime configuration: data directory and user settings.

use std::path::PathBuf;

use courier_domain::Settings;
use courier_infrastructure::{DataStore, PersistenceError, default_data_dir};

use crate::cli::Cli;

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the JSON stores live.
    pub data_dir: PathBuf,
    /// Settings from `settings.json` with command-line overrides applied.
    pub settings: Settings,
}

impl Config {
    /// Resolves the data directory and loads settings.
    ///
    /// The data directory comes from `--data-dir` / `COURIER_DATA_DIR`, else
    /// the platform default. A `--timeout-ms` value overrides the stored
    /// request timeout for this invocation only.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined or the
    /// settings file exists but is unreadable.
    pub async fn load(cli: &Cli) -> Result<Self, PersistenceError> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        let mut settings = DataStore::open(&data_dir).settings.load().await?;
        if let Some(timeout_ms) = cli.timeout_ms {
            settings.request_timeout_ms = timeout_ms;
        }
        Ok(Self { data_dir, settings })
    }

    /// Opens the stores of the configured data directory.
    #[must_use]
    pub fn store(&self) -> DataStore {
        DataStore::open(&self.data_dir)
    }
}
