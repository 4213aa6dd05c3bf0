//! Postman Collection v2.1 Type Definitions
//!
//! These types cover the parts of a Postman Collection v2.1 file that map
//! onto a Courier collection. They are used in both directions, so optional
//! fields are skipped on output and defaulted on input.

#![allow(missing_docs)]

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Schema URL written into exported collections.
pub const POSTMAN_SCHEMA: &str =
    "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Root structure for Postman Collection v2.1
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanCollection {
    #[serde(default)]
    pub info: PostmanInfo,
    #[serde(default)]
    pub item: Vec<PostmanItem>,
    #[serde(default)]
    pub variable: Vec<PostmanVariable>,
}

/// Collection metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "_postman_id", default, skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// An item is either a folder (with `item`) or a request (with `request`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Self>>,
    #[serde(
        default,
        deserialize_with = "request_or_url",
        skip_serializing_if = "Option::is_none"
    )]
    pub request: Option<PostmanRequest>,
    #[serde(default)]
    pub event: Vec<PostmanEvent>,
}

impl PostmanItem {
    /// Returns the sub-items when this item is a folder.
    #[must_use]
    pub fn children(&self) -> Option<&[Self]> {
        self.item.as_deref()
    }

    /// Returns the script attached to the given event, lines joined by `\n`.
    #[must_use]
    pub fn script(&self, listen: &str) -> String {
        self.event
            .iter()
            .filter(|e| e.listen == listen)
            .filter_map(|e| e.script.as_ref())
            .map(|s| s.exec.text())
            .next_back()
            .unwrap_or_default()
    }
}

/// A request may be given as a bare URL string; any other non-object value
/// reads as an empty request.
fn request_or_url<'de, D>(deserializer: D) -> Result<Option<PostmanRequest>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Url(String),
        Full(Box<PostmanRequest>),
        Other(IgnoredAny),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Url(url) => PostmanRequest {
            url: PostmanUrl::Simple(url),
            ..PostmanRequest::default()
        },
        Raw::Full(request) => *request,
        Raw::Other(_) => PostmanRequest::default(),
    }))
}

/// Postman Request definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub header: Vec<PostmanHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PostmanBody>,
    #[serde(default)]
    pub url: PostmanUrl,
}

/// URL can be either a simple string or a structured object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanUrl {
    #[default]
    Empty,
    Simple(String),
    Structured(PostmanUrlStructured),
}

impl PostmanUrl {
    /// Get the raw URL string, rebuilding it from its parts when `raw` is
    /// absent.
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Simple(s) => s.clone(),
            Self::Structured(s) => s.raw.clone().unwrap_or_else(|| s.rebuild()),
        }
    }
}

/// Structured URL object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanUrlStructured {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default)]
    pub host: PostmanUrlParts,
    #[serde(default)]
    pub path: PostmanUrlParts,
}

/// `host` and `path` are either one string or a list of segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanUrlParts {
    Joined(String),
    Segments(Vec<PostmanUrlSegment>),
}

impl Default for PostmanUrlParts {
    fn default() -> Self {
        Self::Segments(Vec::new())
    }
}

impl PostmanUrlParts {
    /// Returns true when there is nothing to join.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Joined(text) => text.is_empty(),
            Self::Segments(segments) => segments.is_empty(),
        }
    }

    /// Joins the segments with `separator`.
    #[must_use]
    pub fn join(&self, separator: &str) -> String {
        match self {
            Self::Joined(text) => text.clone(),
            Self::Segments(segments) => segments
                .iter()
                .map(PostmanUrlSegment::text)
                .collect::<Vec<_>>()
                .join(separator),
        }
    }
}

impl From<Vec<String>> for PostmanUrlParts {
    fn from(segments: Vec<String>) -> Self {
        Self::Segments(segments.into_iter().map(PostmanUrlSegment::Text).collect())
    }
}

/// A path segment is a string or a `{ "type", "value" }` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanUrlSegment {
    Text(String),
    Described {
        #[serde(default)]
        value: Option<String>,
    },
}

impl PostmanUrlSegment {
    fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Described { value } => value.as_deref().unwrap_or_default(),
        }
    }
}

impl PostmanUrlStructured {
    fn rebuild(&self) -> String {
        let mut url = String::new();
        if let Some(protocol) = self.protocol.as_deref().filter(|p| !p.is_empty()) {
            url.push_str(protocol);
            url.push_str("://");
        }
        url.push_str(&self.host.join("."));
        let path = self.path.join("/");
        if !path.is_empty() {
            if !path.starts_with('/') {
                url.push('/');
            }
            url.push_str(&path);
        }
        url
    }
}

/// Request header
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanHeader {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub header_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

/// Request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urlencoded: Vec<PostmanFormParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PostmanBodyOptions>,
}

/// Form URL-encoded parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanFormParam {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

/// Body options (e.g., raw language)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanBodyOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<PostmanRawOptions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanRawOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Variable definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanVariable {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

/// Event (pre-request or test script)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanEvent {
    #[serde(default)]
    pub listen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<PostmanScript>,
}

/// Script definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanScript {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,
    #[serde(default)]
    pub exec: PostmanExec,
}

/// Script source: a list of lines or a single string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanExec {
    Lines(Vec<String>),
    Text(String),
}

impl Default for PostmanExec {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

impl PostmanExec {
    /// Returns the script text.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Lines(lines) => lines.join("\n"),
            Self::Text(text) => text.clone(),
        }
    }
}
