//! Per-collection script context
//!
//! Each collection owns a bag of JSON values that pre- and post-request
//! scripts read and write. Values written while running one request are
//! visible to every later request of the same collection, within a run and
//! across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The key-value scratch space of a single collection.
pub type ContextMap = serde_json::Map<String, Value>;

/// Context scopes keyed by collection id.
///
/// Serialises as a JSON object whose keys are the collection ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextStore {
    scopes: BTreeMap<i64, ContextMap>,
}

impl ContextStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scopes: BTreeMap::new(),
        }
    }

    /// Returns the context of a collection, if it has one.
    #[must_use]
    pub fn scope(&self, collection_id: i64) -> Option<&ContextMap> {
        self.scopes.get(&collection_id)
    }

    /// Returns the writable context of a collection, creating it on first use.
    pub fn scope_mut(&mut self, collection_id: i64) -> &mut ContextMap {
        self.scopes.entry(collection_id).or_default()
    }

    /// Reads one value from a collection's context.
    #[must_use]
    pub fn get(&self, collection_id: i64, key: &str) -> Option<&Value> {
        self.scope(collection_id).and_then(|scope| scope.get(key))
    }

    /// Writes one value into a collection's context.
    pub fn set(&mut self, collection_id: i64, key: impl Into<String>, value: Value) {
        self.scope_mut(collection_id).insert(key.into(), value);
    }

    /// Returns the keys stored for a collection, in sorted order.
    #[must_use]
    pub fn keys(&self, collection_id: i64) -> Vec<String> {
        self.scope(collection_id)
            .map(|scope| scope.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Removes a collection's context entirely.
    pub fn clear(&mut self, collection_id: i64) {
        self.scopes.remove(&collection_id);
    }

    /// Removes every context.
    pub fn clear_all(&mut self) {
        self.scopes.clear();
    }

    /// Returns true when no collection has a context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Exports every context as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Imports contexts previously produced by [`ContextStore::to_json`].
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object of objects keyed by
    /// collection id.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
