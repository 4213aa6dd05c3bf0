//! File-based persistence for collections, history, contexts and settings.
//!
//! Each store is a single JSON file inside the data directory:
//! - `collections.json`
//! - `history.json`
//! - `contexts.json`
//! - `settings.json`

mod collection_repository;
mod context_repository;
mod history_repository;
mod json_file;
mod settings_repository;

use std::path::{Path, PathBuf};

pub use collection_repository::{COLLECTIONS_FILE, FileCollectionRepository};
pub use context_repository::{CONTEXTS_FILE, FileContextRepository};
pub use history_repository::{FileHistoryRepository, HISTORY_FILE};
pub use json_file::{
    PersistenceError, read_or_default, remove_if_exists, to_json_pretty, write_atomic,
};
pub use settings_repository::{SETTINGS_FILE, SettingsRepository};

/// Returns the platform data directory for Courier.
///
/// - Linux: `~/.local/share/courier`
/// - macOS: `~/Library/Application Support/courier`
/// - Windows: `%APPDATA%\courier`
///
/// # Errors
///
/// Returns `PersistenceError::NoDataDir` if the platform has none.
pub fn default_data_dir() -> Result<PathBuf, PersistenceError> {
    dirs::data_dir()
        .map(|p| p.join("courier"))
        .ok_or(PersistenceError::NoDataDir)
}

/// Size of one store on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreUsage {
    /// File name inside the data directory.
    pub file: &'static str,
    /// Size in bytes, `None` when the file does not exist.
    pub bytes: Option<u64>,
}

/// All stores of one data directory.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
    /// Collections.
    pub collections: FileCollectionRepository,
    /// Request history.
    pub history: FileHistoryRepository,
    /// Script contexts.
    pub contexts: FileContextRepository,
    /// User settings.
    pub settings: SettingsRepository,
}

impl DataStore {
    const FILES: [&'static str; 4] = [COLLECTIONS_FILE, HISTORY_FILE, CONTEXTS_FILE, SETTINGS_FILE];

    /// Opens the stores rooted at `root`. Nothing is read until a load.
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            collections: FileCollectionRepository::new(&root),
            history: FileHistoryRepository::new(&root),
            contexts: FileContextRepository::new(&root),
            settings: SettingsRepository::new(&root),
            root,
        }
    }

    /// Returns the data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reports the size of every store file.
    pub async fn usage(&self) -> Vec<StoreUsage> {
        let mut usage = Vec::with_capacity(Self::FILES.len());
        for file in Self::FILES {
            let bytes = tokio::fs::metadata(self.root.join(file))
                .await
                .ok()
                .map(|m| m.len());
            usage.push(StoreUsage { file, bytes });
        }
        usage
    }

    /// Deletes every store file. Settings are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be removed.
    pub async fn clear_all(&self) -> Result<(), PersistenceError> {
        for file in [COLLECTIONS_FILE, HISTORY_FILE, CONTEXTS_FILE] {
            remove_if_exists(&self.root.join(file)).await?;
        }
        Ok(())
    }
}
