//! Courier Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Variable interpolation for `${name}` placeholders
//! - Port traits (interfaces for external dependencies)
//! - The single-request send use case
//! - The fail-fast collection runner
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod run_collection;
pub mod send_request;
pub mod variable_resolver;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    CancellationReceiver, CancellationToken, Clock, CollectionStorage, ContextStorage,
    HistoryStorage, HttpClient, HttpClientError, ScriptEngine,
};
pub use run_collection::{
    CollectionRunner, NoopObserver, RunError, RunObserver, RunReport,
};
pub use send_request::{SendOutcome, SendRequest, SendRequestError};
pub use variable_resolver::{MissingVariableError, Validation, VariableResolver};
