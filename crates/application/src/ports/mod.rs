//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod http_client;
mod script_engine;
mod storage;

pub use clock::Clock;
pub use http_client::{CancellationReceiver, CancellationToken, HttpClient, HttpClientError};
pub use script_engine::ScriptEngine;
pub use storage::{CollectionStorage, ContextStorage, HistoryStorage};
