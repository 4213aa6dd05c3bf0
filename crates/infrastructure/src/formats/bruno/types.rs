//! Bruno collection type definitions.
//!
//! Covers the JSON collection export of Bruno: a tree of `http` and
//! `folder` items plus named environments.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root structure of a Bruno collection export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrunoCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub items: Vec<BrunoItem>,
    #[serde(default)]
    pub environments: Vec<BrunoEnvironment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bruno_config: Option<BrunoConfig>,
}

/// A request (`type: "http"`) or a folder (`type: "folder"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrunoItem {
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<BrunoRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Self>,
}

impl BrunoItem {
    pub const HTTP: &'static str = "http";
    pub const FOLDER: &'static str = "folder";
}

/// Request definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrunoRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Vec<BrunoHeader>,
    #[serde(default)]
    pub params: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BrunoBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<BrunoScript>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<BrunoAuth>,
}

/// Request header; older exports use `key` instead of `name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrunoHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

/// Request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrunoBody {
    #[serde(default)]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default)]
    pub form_url_encoded: Vec<Value>,
    #[serde(default)]
    pub multipart_form: Vec<Value>,
}

/// Pre-request (`req`) and post-response (`res`) scripts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrunoScript {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub res: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrunoAuth {
    #[serde(default)]
    pub mode: String,
}

/// A named set of variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrunoEnvironment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variables: Vec<BrunoVariable>,
}

/// Environment variable; older exports use `key` instead of `name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrunoVariable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrunoConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub config_type: Option<String>,
}

const fn enabled() -> bool {
    true
}
