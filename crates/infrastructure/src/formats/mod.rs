//! Collection format conversion.
//!
//! Collections can be exported as native Courier JSON, Postman v2.1 or Bruno
//! JSON, and imported from any of the three. Import detects the format of
//! every top-level object separately, so arrays may mix formats.
//!
//! Header field naming differs between formats (`key` in Postman, `name` in
//! Bruno and native). The mappers in this module are the only place where
//! that difference is handled.

pub mod bruno;
pub mod native;
pub mod postman;

use std::fmt;
use std::str::FromStr;

use courier_domain::{Collection, HttpMethod};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Supported collection formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionFormat {
    /// Courier's own persisted format.
    Native,
    /// Postman Collection v2.1.
    Postman,
    /// Bruno JSON export.
    Bruno,
}

impl CollectionFormat {
    /// Returns all formats in detection priority order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Bruno, Self::Postman, Self::Native]
    }

    /// Returns the lowercase name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Postman => "postman",
            Self::Bruno => "bruno",
        }
    }
}

impl fmt::Display for CollectionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "courier" => Ok(Self::Native),
            "postman" => Ok(Self::Postman),
            "bruno" => Ok(Self::Bruno),
            other => Err(FormatError::UnknownFormatName(other.to_string())),
        }
    }
}

/// Errors raised while importing or exporting collections.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The input is not valid JSON.
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A top-level object matches none of the known formats.
    #[error("{}", unrecognized_message(.index))]
    UnrecognizedFormat {
        /// Position of the offending element when the input is an array.
        index: Option<usize>,
    },

    /// The object looked like a known format but its fields do not fit it.
    #[error("Invalid {format} collection: {message}")]
    InvalidStructure {
        /// The detected format.
        format: CollectionFormat,
        /// What did not fit.
        message: String,
    },

    /// Export serialization failed.
    #[error("Failed to serialize collections: {0}")]
    Serialize(serde_json::Error),

    /// An unknown format name was requested.
    #[error("Unknown format '{0}' (expected native, postman or bruno)")]
    UnknownFormatName(String),
}

#[allow(clippy::ref_option)]
fn unrecognized_message(index: &Option<usize>) -> String {
    let base = "Invalid format: Expected a collection or array of collections";
    match index {
        Some(i) => format!("{base} (element {i} is not a recognized collection)"),
        None => base.to_string(),
    }
}

/// Result type for format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// JavaScript-style truthiness, used by the structural format checks.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Detects the format of a single top-level collection object.
///
/// Checks run in a fixed order: Bruno (`items` plus `brunoConfig` or
/// `version`), then Postman (`info` plus `item`), then native (`id`, or
/// `name` plus `requests`).
#[must_use]
pub fn detect_format(value: &Value) -> Option<CollectionFormat> {
    let object = value.as_object()?;
    let has = |key: &str| truthy(object.get(key));

    if has("items") && (has("brunoConfig") || has("version")) {
        Some(CollectionFormat::Bruno)
    } else if has("info") && has("item") {
        Some(CollectionFormat::Postman)
    } else if has("id") || (has("name") && has("requests")) {
        Some(CollectionFormat::Native)
    } else {
        None
    }
}

/// Exports collections as pretty-printed JSON in the given format.
///
/// Postman and native exports are always arrays. A Bruno export of exactly
/// one collection is a bare object; any other count produces an array.
///
/// # Errors
///
/// Returns `FormatError::Serialize` if the output cannot be serialized.
pub fn export_collections(
    collections: &[Collection],
    format: CollectionFormat,
) -> FormatResult<String> {
    let json = match format {
        CollectionFormat::Native => native::to_json(collections),
        CollectionFormat::Postman => {
            let exported: Vec<_> = collections.iter().map(postman::to_postman).collect();
            serde_json::to_string_pretty(&exported)
        }
        CollectionFormat::Bruno => {
            let exported: Vec<_> = collections.iter().map(bruno::to_bruno).collect();
            match exported.as_slice() {
                [single] => serde_json::to_string_pretty(single),
                _ => serde_json::to_string_pretty(&exported),
            }
        }
    };
    json.map_err(FormatError::Serialize)
}

/// Imports collections from JSON text in any supported format.
///
/// The import is all-or-nothing: if any element fails, no collection is
/// returned.
///
/// # Errors
///
/// Returns an error if the text is not JSON, if a top-level object is not
/// recognized, or if a recognized object has an invalid structure.
pub fn import_collections(json: &str) -> FormatResult<Vec<Collection>> {
    let parsed: Value = serde_json::from_str(json)?;

    match parsed {
        Value::Array(elements) => elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| import_one(element, Some(index)))
            .collect(),
        single => Ok(vec![import_one(single, None)?]),
    }
}

fn import_one(value: Value, index: Option<usize>) -> FormatResult<Collection> {
    let Some(format) = detect_format(&value) else {
        return Err(FormatError::UnrecognizedFormat { index });
    };
    debug!(%format, ?index, "detected collection format");

    let invalid = |e: serde_json::Error| FormatError::InvalidStructure {
        format,
        message: e.to_string(),
    };
    let collection = match format {
        CollectionFormat::Bruno => {
            bruno::from_bruno(serde_json::from_value(value).map_err(invalid)?)
        }
        CollectionFormat::Postman => {
            postman::from_postman(serde_json::from_value(value).map_err(invalid)?)
        }
        CollectionFormat::Native => {
            native::from_native(serde_json::from_value(value).map_err(invalid)?)
        }
    };
    Ok(collection)
}

/// Parses an imported method name, falling back to GET.
pub(crate) fn parse_method(method: Option<&str>) -> HttpMethod {
    match method.map(str::trim).filter(|m| !m.is_empty()) {
        None => HttpMethod::Get,
        Some(name) => name.parse().unwrap_or_else(|_| {
            warn!(method = name, "unsupported HTTP method in imported request, using GET");
            HttpMethod::Get
        }),
    }
}

/// Renders an imported JSON scalar as a variable value.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Returns the first non-empty candidate, or an empty string.
pub(crate) fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}
