//! Courier Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the reqwest transport, the system
//! clock, the script sandbox, collection format conversion and JSON file
//! persistence.

pub mod adapters;
pub mod formats;
pub mod persistence;
pub mod scripting;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use formats::{
    CollectionFormat, FormatError, FormatResult, detect_format, export_collections,
    import_collections,
};
pub use persistence::{
    DataStore, FileCollectionRepository, FileContextRepository, FileHistoryRepository,
    PersistenceError, SettingsRepository, StoreUsage, default_data_dir,
};
pub use scripting::{ScriptExecutor, ScriptParseError, parse_script};
