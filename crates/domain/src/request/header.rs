//! HTTP Header types

use serde::{Deserialize, Serialize};

/// A single request header as stored in a collection.
///
/// Blank entries (empty name or value) are allowed at rest and are only
/// filtered out when the request is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHeader {
    /// The header name (e.g., "Content-Type").
    #[serde(default)]
    pub name: String,
    /// The header value (e.g., "application/json").
    #[serde(default)]
    pub value: String,
}

impl RequestHeader {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns true when either the name or the value is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() || self.value.is_empty()
    }
}
