//! Request history persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use courier_application::{ApplicationResult, HistoryStorage};
use courier_domain::RequestHistory;

use super::json_file::{read_or_default, write_atomic};

/// File name of the history store.
pub const HISTORY_FILE: &str = "history.json";

/// Stores request history in `<data dir>/history.json`.
#[derive(Debug, Clone)]
pub struct FileHistoryRepository {
    path: PathBuf,
}

impl FileHistoryRepository {
    /// Creates a repository rooted at the given data directory.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(HISTORY_FILE),
        }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistoryStorage for FileHistoryRepository {
    async fn load(&self) -> ApplicationResult<RequestHistory> {
        Ok(read_or_default(&self.path).await?)
    }

    async fn save(&self, history: &RequestHistory) -> ApplicationResult<()> {
        Ok(write_atomic(&self.path, history).await?)
    }
}
