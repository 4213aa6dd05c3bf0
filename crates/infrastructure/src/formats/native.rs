//! Native Courier collection format.
//!
//! Export is the persisted model as-is. Import is lenient: missing fields
//! take defaults, `null` lists and maps count as empty, fractional or missing
//! ids are replaced, and header entries may use either `name` or `key`.

use std::collections::BTreeMap;

use courier_domain::{Collection, Request, RequestHeader, generate_id};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{parse_method, value_to_string};

/// A native collection as found in an import file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativeCollection {
    id: Option<Value>,
    name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    requests: Vec<NativeRequest>,
    #[serde(deserialize_with = "null_as_default")]
    variables: BTreeMap<String, Value>,
}

/// A native request as found in an import file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativeRequest {
    id: Option<Value>,
    name: Option<String>,
    url: Option<String>,
    method: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    headers: Vec<NativeHeader>,
    body: Option<String>,
    pre_request_script: Option<String>,
    post_request_script: Option<String>,
}

/// A header entry; `key` is accepted for `name`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NativeHeader {
    #[serde(alias = "key")]
    name: Option<String>,
    value: Option<Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serializes collections in the native format.
pub(crate) fn to_json(collections: &[Collection]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(collections)
}

/// Keeps integral ids; anything else gets a fresh one.
fn id_or_generate(id: Option<&Value>) -> i64 {
    id.and_then(Value::as_i64)
        .filter(|id| *id != 0)
        .unwrap_or_else(generate_id)
}

/// Converts an imported native collection.
#[must_use]
pub fn from_native(native: NativeCollection) -> Collection {
    Collection {
        id: id_or_generate(native.id.as_ref()),
        name: native.name.unwrap_or_default(),
        requests: native.requests.into_iter().map(request_from_native).collect(),
        variables: native
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect(),
    }
}

fn request_from_native(native: NativeRequest) -> Request {
    Request {
        id: id_or_generate(native.id.as_ref()),
        name: native.name.unwrap_or_default(),
        url: native.url.unwrap_or_default(),
        method: parse_method(native.method.as_deref()),
        headers: native
            .headers
            .into_iter()
            .map(|h| {
                RequestHeader::new(
                    h.name.unwrap_or_default(),
                    h.value.as_ref().map(value_to_string).unwrap_or_default(),
                )
            })
            .collect(),
        body: native.body.unwrap_or_default(),
        pre_request_script: native.pre_request_script.unwrap_or_default(),
        post_request_script: native.post_request_script.unwrap_or_default(),
    }
}
