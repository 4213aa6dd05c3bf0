//! Storage ports
//!
//! Collections, history and contexts are persisted by the host between
//! process lifetimes. A missing store loads as empty.

use async_trait::async_trait;
use courier_domain::{Collection, ContextStore, RequestHistory};

use crate::ApplicationResult;

/// Port for persisting the list of collections.
#[async_trait]
pub trait CollectionStorage: Send + Sync {
    /// Loads every collection, in stored order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read or parsed.
    async fn load(&self) -> ApplicationResult<Vec<Collection>>;

    /// Replaces the stored collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the collections cannot be serialized or written.
    async fn save(&self, collections: &[Collection]) -> ApplicationResult<()>;
}

/// Port for persisting request history.
#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// Loads the history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read or parsed.
    async fn load(&self) -> ApplicationResult<RequestHistory>;

    /// Replaces the stored history.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be serialized or written.
    async fn save(&self, history: &RequestHistory) -> ApplicationResult<()>;
}

/// Port for persisting per-collection script contexts.
#[async_trait]
pub trait ContextStorage: Send + Sync {
    /// Loads every context.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read or parsed.
    async fn load(&self) -> ApplicationResult<ContextStore>;

    /// Replaces the stored contexts.
    ///
    /// # Errors
    ///
    /// Returns an error if the contexts cannot be serialized or written.
    async fn save(&self, contexts: &ContextStore) -> ApplicationResult<()>;
}
