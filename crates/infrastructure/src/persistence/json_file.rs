//! JSON files on disk.
//!
//! Every store is one pretty-printed JSON document (2-space indent, trailing
//! newline). Writes go to a sibling temporary file that is renamed over the
//! target, so a crash never leaves a half-written store behind.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::fs;
use tracing::debug;

/// Error type for file-backed stores.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Reading or writing the file failed.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The file content is not valid JSON for the store.
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        /// The file involved.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },

    /// No data directory could be determined for this platform.
    #[error("Could not determine data directory")]
    NoDataDir,
}

impl From<PersistenceError> for courier_application::ApplicationError {
    fn from(error: PersistenceError) -> Self {
        Self::Storage(error.to_string())
    }
}

/// Serializes a value as pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    buffer.push(b'\n');
    Ok(buffer)
}

/// Reads a JSON file, returning the default value when it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn read_or_default<T>(path: &Path) -> Result<T, PersistenceError>
where
    T: DeserializeOwned + Default,
{
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "store not found, using default");
            return Ok(T::default());
        }
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes a value as JSON, atomically replacing the file.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails.
pub async fn write_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), PersistenceError> {
    let io_error = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = to_json_pretty(value).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let temp = temp_path(path);
    fs::write(&temp, content).await.map_err(io_error)?;
    fs::rename(&temp, path).await.map_err(io_error)?;
    debug!(path = %path.display(), "store written");
    Ok(())
}

/// Removes a file; a missing file is not an error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub async fn remove_if_exists(path: &Path) -> Result<bool, PersistenceError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
