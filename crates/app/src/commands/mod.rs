//! Command handlers.
//!
//! Every handler loads what it needs from the data directory, applies a
//! pure transition or runs requests, and writes the affected stores back.

mod collections;
mod execute;
mod stores;

use std::process::ExitCode;

use courier_application::{
    ApplicationError, HttpClientError, RunError, SendRequestError,
};
use courier_domain::{Collection, DomainError, Request, RequestHeader};
use courier_infrastructure::{FormatError, PersistenceError};
use thiserror::Error;

use crate::cli::Command;
use crate::config::Config;

/// Errors surfaced to the user by a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No collection matches the given name or id.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// No request in the collection matches the given name or id.
    #[error("Request '{request}' not found in '{collection}'")]
    RequestNotFound {
        /// Collection name.
        collection: String,
        /// Name or id that was looked up.
        request: String,
    },

    /// A `--header` value is not of the form `Name: value`.
    #[error("Invalid header '{0}': expected 'Name: value'")]
    InvalidHeader(String),

    /// A variable assignment is not of the form `KEY=VALUE`.
    #[error("Invalid assignment '{0}': expected KEY=VALUE")]
    InvalidAssignment(String),

    /// Reading or writing a user-supplied file failed.
    #[error("{path}: {source}")]
    File {
        /// The file involved.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Import or export failed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A store could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A storage port failed.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The collection was rejected.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Http(#[from] HttpClientError),

    /// A single send failed before a response arrived.
    #[error(transparent)]
    Send(#[from] SendRequestError),

    /// A collection run could not start.
    #[error(transparent)]
    Run(#[from] RunError),
}

/// Result type for command handlers.
pub type CommandResult = Result<ExitCode, CommandError>;

/// Dispatches a parsed command.
///
/// # Errors
///
/// Returns the first error the command hits.
pub async fn execute(command: Command, config: &Config) -> CommandResult {
    match command {
        Command::Import { file } => collections::import(config, &file).await,
        Command::Export {
            format,
            output,
            collections: selected,
        } => collections::export(config, format.into(), output.as_deref(), &selected).await,
        Command::List => collections::list(config).await,
        Command::Collection(command) => collections::collection(config, command).await,
        Command::Request(command) => collections::request(config, command).await,
        Command::Vars {
            collection,
            assignments,
            unset,
        } => collections::vars(config, &collection, &assignments, &unset).await,
        Command::Run { collection } => execute::run(config, &collection).await,
        Command::Send {
            collection,
            request,
            verbose,
        } => execute::send(config, &collection, &request, verbose).await,
        Command::History(args) => stores::history(config, &args).await,
        Command::Context { collection, clear } => {
            stores::context(config, &collection, clear).await
        }
        Command::Storage { clear } => stores::storage(config, clear).await,
    }
}

/// Finds a collection by exact name, falling back to its numeric id.
pub(crate) fn find_collection<'a>(
    collections: &'a [Collection],
    key: &str,
) -> Result<&'a Collection, CommandError> {
    collections
        .iter()
        .find(|c| c.name == key)
        .or_else(|| {
            key.parse::<i64>()
                .ok()
                .and_then(|id| collections.iter().find(|c| c.id == id))
        })
        .ok_or_else(|| CommandError::CollectionNotFound(key.to_string()))
}

/// Finds a request by exact name, falling back to its numeric id.
pub(crate) fn find_request<'a>(
    collection: &'a Collection,
    key: &str,
) -> Result<&'a Request, CommandError> {
    collection
        .request_by_name(key)
        .or_else(|| key.parse::<i64>().ok().and_then(|id| collection.request(id)))
        .ok_or_else(|| CommandError::RequestNotFound {
            collection: collection.name.clone(),
            request: key.to_string(),
        })
}

/// Parses `Name: value`. The value may be empty.
pub(crate) fn parse_header(raw: &str) -> Result<RequestHeader, CommandError> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok(RequestHeader::new(name.trim(), value.trim()))
        }
        _ => Err(CommandError::InvalidHeader(raw.to_string())),
    }
}

/// Parses `KEY=VALUE`. Only the first `=` separates; the value may be empty.
pub(crate) fn parse_assignment(raw: &str) -> Result<(String, String), CommandError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CommandError::InvalidAssignment(raw.to_string())),
    }
}
