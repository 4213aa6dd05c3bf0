//! Collection persistence.
//!
//! All collections live in one `collections.json` file in native format.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use courier_application::{ApplicationResult, CollectionStorage};
use courier_domain::Collection;
use courier_domain::collection::store::validate_collection;

use super::json_file::{read_or_default, write_atomic};

/// File name of the collection store.
pub const COLLECTIONS_FILE: &str = "collections.json";

/// Stores collections in `<data dir>/collections.json`.
#[derive(Debug, Clone)]
pub struct FileCollectionRepository {
    path: PathBuf,
}

impl FileCollectionRepository {
    /// Creates a repository rooted at the given data directory.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(COLLECTIONS_FILE),
        }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CollectionStorage for FileCollectionRepository {
    async fn load(&self) -> ApplicationResult<Vec<Collection>> {
        Ok(read_or_default(&self.path).await?)
    }

    async fn save(&self, collections: &[Collection]) -> ApplicationResult<()> {
        for collection in collections {
            validate_collection(collection)?;
        }
        Ok(write_atomic(&self.path, collections).await?)
    }
}
