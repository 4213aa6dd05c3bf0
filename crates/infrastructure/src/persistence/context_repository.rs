//! Script context persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use courier_application::{ApplicationResult, ContextStorage};
use courier_domain::ContextStore;

use super::json_file::{read_or_default, write_atomic};

/// File name of the context store.
pub const CONTEXTS_FILE: &str = "contexts.json";

/// Stores every collection's context in `<data dir>/contexts.json`.
#[derive(Debug, Clone)]
pub struct FileContextRepository {
    path: PathBuf,
}

impl FileContextRepository {
    /// Creates a repository rooted at the given data directory.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CONTEXTS_FILE),
        }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ContextStorage for FileContextRepository {
    async fn load(&self) -> ApplicationResult<ContextStore> {
        Ok(read_or_default(&self.path).await?)
    }

    async fn save(&self, contexts: &ContextStore) -> ApplicationResult<()> {
        Ok(write_atomic(&self.path, contexts).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let repo = FileContextRepository::new(dir.path());
        assert!(repo.load().await.unwrap().is_empty());

        let mut store = ContextStore::new();
        store.set(7, "token", json!("abc"));
        store.set(7, "count", json!(3));
        repo.save(&store).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.get(7, "token"), Some(&json!("abc")));
    }
}
