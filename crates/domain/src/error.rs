//! Domain error types

use thiserror::Error;

/// Rejections raised by domain parsing and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The method is not one of the seven supported verbs.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A collection breaks an identity or naming rule.
    #[error("invalid collection: {0}")]
    InvalidCollection(String),
}

/// Result of a domain operation.
pub type DomainResult<T> = Result<T, DomainError>;
