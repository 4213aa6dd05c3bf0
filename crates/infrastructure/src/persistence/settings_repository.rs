//! Settings persistence.

use std::path::{Path, PathBuf};

use courier_domain::Settings;

use super::json_file::{PersistenceError, read_or_default, write_atomic};

/// File name of the settings store.
pub const SETTINGS_FILE: &str = "settings.json";

/// Stores user settings in `<data dir>/settings.json`.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: PathBuf,
}

impl SettingsRepository {
    /// Creates a repository rooted at the given data directory.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SETTINGS_FILE),
        }
    }

    /// Loads settings, falling back to defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Settings, PersistenceError> {
        read_or_default(&self.path).await
    }

    /// Saves settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, settings: &Settings) -> Result<(), PersistenceError> {
        write_atomic(&self.path, settings).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_defaults_then_roundtrip() {
        let dir = TempDir::new().unwrap();
        let repo = SettingsRepository::new(dir.path());
        assert_eq!(repo.load().await.unwrap(), Settings::default());

        let settings = Settings {
            history_limit: 5,
            request_timeout_ms: 1_000,
            ..Settings::default()
        };
        repo.save(&settings).await.unwrap();
        assert_eq!(repo.load().await.unwrap(), settings);
    }
}
