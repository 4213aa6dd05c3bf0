//! Errors reported through the storage ports.

use courier_domain::DomainError;
use thiserror::Error;

/// Failure of a storage adapter.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The backing store could not be read, parsed or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// A collection was rejected before being written.
    #[error("refusing to save: {0}")]
    Rejected(#[from] DomainError),
}

/// Result of a storage port call.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
