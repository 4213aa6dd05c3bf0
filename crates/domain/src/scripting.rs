//! Pre-request and post-request scripting.
//!
//! This module provides the data a script can see and change, the syntax
//! tree of the script language, and the error raised when a script fails.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::collection::Variables;
use crate::context::ContextMap;
use crate::request::{HttpMethod, RequestHeader, RequestSpec};
use crate::response::ResponseSpec;

/// When a script runs relative to the HTTP call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptPhase {
    /// Before the request is sent.
    PreRequest,
    /// After the response is received.
    PostRequest,
}

impl fmt::Display for ScriptPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreRequest => f.write_str("Pre-request"),
            Self::PostRequest => f.write_str("Post-request"),
        }
    }
}

/// A script failed to parse or raised an error while running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{phase} script error: {message}")]
pub struct ScriptError {
    /// The phase the script ran in.
    pub phase: ScriptPhase,
    /// The underlying error message.
    pub message: String,
}

impl ScriptError {
    /// Creates an error for a pre-request script.
    #[must_use]
    pub fn pre_request(message: impl Into<String>) -> Self {
        Self {
            phase: ScriptPhase::PreRequest,
            message: message.into(),
        }
    }

    /// Creates an error for a post-request script.
    #[must_use]
    pub fn post_request(message: impl Into<String>) -> Self {
        Self {
            phase: ScriptPhase::PostRequest,
            message: message.into(),
        }
    }
}

/// The request as seen and rewritten by a pre-request script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptRequest {
    /// Target URL.
    pub url: String,
    /// HTTP method (read-only for scripts).
    pub method: HttpMethod,
    /// Headers in order.
    pub headers: Vec<RequestHeader>,
    /// Body text.
    pub body: String,
}

impl ScriptRequest {
    /// Sets a header, replacing the value of the first header with exactly
    /// the same name or appending a new one.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.iter_mut().find(|h| h.name == name) {
            Some(existing) => existing.value = value,
            None => self.headers.push(RequestHeader::new(name, value)),
        }
    }
}

impl From<RequestSpec> for ScriptRequest {
    fn from(spec: RequestSpec) -> Self {
        Self {
            url: spec.url,
            method: spec.method,
            headers: spec.headers,
            body: spec.body,
        }
    }
}

impl From<ScriptRequest> for RequestSpec {
    fn from(request: ScriptRequest) -> Self {
        Self {
            method: request.method,
            url: request.url,
            headers: request.headers,
            body: request.body,
        }
    }
}

/// The response as seen by a post-request script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptResponse {
    /// Raw body text.
    pub text: String,
    /// Parsed body, when the text is valid JSON.
    pub json: Option<Value>,
    /// Headers keyed by lower-cased name.
    pub headers: BTreeMap<String, String>,
    /// HTTP status code.
    pub status: u16,
}

impl ScriptResponse {
    /// The parsed body, or the raw text as a JSON string when it is not JSON.
    #[must_use]
    pub fn body_value(&self) -> Value {
        self.json
            .clone()
            .unwrap_or_else(|| Value::String(self.text.clone()))
    }

    /// Resolves a dot-separated path through the parsed body.
    ///
    /// Object keys are matched by name and array elements by decimal index.
    /// Returns `None` as soon as a segment is missing or the current value
    /// cannot be descended into.
    #[must_use]
    pub fn value_at(&self, path: &str) -> Option<&Value> {
        let mut current = self.json.as_ref()?;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Looks up a header by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl From<&ResponseSpec> for ScriptResponse {
    fn from(response: &ResponseSpec) -> Self {
        Self {
            text: response.body.clone(),
            json: response.json(),
            headers: response.headers.clone(),
            status: response.status,
        }
    }
}

/// The scopes a script runs against.
///
/// Variables are read-only; the context belongs to the collection being run
/// and receives the script's `setContext` writes.
#[derive(Debug)]
pub struct ScriptEnv<'a> {
    /// Collection variables.
    pub variables: &'a Variables,
    /// Collection context.
    pub context: &'a mut ContextMap,
}

impl<'a> ScriptEnv<'a> {
    /// Creates an environment over the given scopes.
    pub const fn new(variables: &'a Variables, context: &'a mut ContextMap) -> Self {
        Self { variables, context }
    }
}

/// One statement of a script: a function call evaluated for its effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Source line of the statement, starting at 1.
    pub line: usize,
    /// The call expression.
    pub call: Expr,
}

/// An expression of the script language.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal string, number, boolean or null.
    Literal(Value),
    /// A named value such as `url` or `response`.
    Ident(String),
    /// A function call: `getContext("token")`.
    Call {
        /// Function name (`console.log` style names keep their dot).
        name: String,
        /// Argument expressions.
        args: Vec<Self>,
    },
    /// Property access: `response.data`.
    Member {
        /// The value being accessed.
        object: Box<Self>,
        /// The property name.
        property: String,
    },
    /// Index access: `items[0]` or `headers["x-id"]`.
    Index {
        /// The value being indexed.
        object: Box<Self>,
        /// The index expression.
        index: Box<Self>,
    },
    /// Numeric addition or string concatenation.
    Add(Box<Self>, Box<Self>),
}
