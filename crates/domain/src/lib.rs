//! Courier Domain - Core business types
//!
//! This crate defines the domain model for the Courier API client:
//! collections and their requests, the pure collection store, per-collection
//! script context, request history and collection-run results.
//! All types here are pure Rust with no I/O dependencies.

pub mod collection;
pub mod context;
pub mod error;
pub mod history;
pub mod id;
pub mod request;
pub mod response;
pub mod run;
pub mod scripting;
pub mod settings;

pub use collection::{Collection, Request, RequestDraft, RequestUpdate, Variables};
pub use context::{ContextMap, ContextStore};
pub use error::{DomainError, DomainResult};
pub use history::{DEFAULT_HISTORY_LIMIT, HistoryFilter, HistoryItem, RequestHistory};
pub use id::generate_id;
pub use request::{HttpMethod, RequestHeader, RequestSpec};
pub use response::{ResponseSpec, status_text};
pub use run::{RESPONSE_PREVIEW_CHARS, RunResult, RunState, RunStatus};
pub use scripting::{
    Expr, ScriptEnv, ScriptError, ScriptPhase, ScriptRequest, ScriptResponse, Statement,
};
pub use settings::Settings;
