//! User settings
//!
//! Persisted preferences that shape how requests are sent and how much
//! history is kept.

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_HISTORY_LIMIT;

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of history entries kept.
    pub history_limit: usize,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Maximum number of redirects followed.
    pub max_redirects: usize,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout_ms: 30_000,
            max_redirects: 10,
            user_agent: concat!("courier/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
