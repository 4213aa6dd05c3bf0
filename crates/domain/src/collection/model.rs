//! Collection and request data types (native persisted format)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::request::{HttpMethod, RequestHeader};

/// Collection-scoped variables used to resolve `${name}` placeholders.
pub type Variables = BTreeMap<String, String>;

/// A named, ordered group of saved requests with its own variable scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique identifier within the collection store.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Requests in execution and display order.
    #[serde(default)]
    pub requests: Vec<Request>,
    /// Variable scope for placeholder resolution.
    #[serde(default)]
    pub variables: Variables,
}

impl Collection {
    /// Creates a new empty collection with the given id and name.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            requests: Vec::new(),
            variables: Variables::new(),
        }
    }

    /// Looks up a request by id.
    #[must_use]
    pub fn request(&self, request_id: i64) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == request_id)
    }

    /// Looks up a request by name (exact match).
    #[must_use]
    pub fn request_by_name(&self, name: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.name == name)
    }
}

/// A saved HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Unique identifier within the owning collection.
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Target URL, possibly containing placeholders.
    #[serde(default)]
    pub url: String,
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Headers in authored order; blank entries are kept.
    #[serde(default)]
    pub headers: Vec<RequestHeader>,
    /// Opaque body text.
    #[serde(default)]
    pub body: String,
    /// Script run before the request is sent.
    #[serde(default)]
    pub pre_request_script: String,
    /// Script run after the response arrives.
    #[serde(default)]
    pub post_request_script: String,
}

/// The editable part of a request, as captured from an editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDraft {
    /// Target URL.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Headers.
    pub headers: Vec<RequestHeader>,
    /// Body text.
    pub body: String,
    /// Pre-request script.
    pub pre_request_script: String,
    /// Post-request script.
    pub post_request_script: String,
}

/// A partial update to a saved request. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestUpdate {
    /// New name.
    pub name: Option<String>,
    /// New URL.
    pub url: Option<String>,
    /// New method.
    pub method: Option<HttpMethod>,
    /// New header list.
    pub headers: Option<Vec<RequestHeader>>,
    /// New body.
    pub body: Option<String>,
    /// New pre-request script.
    pub pre_request_script: Option<String>,
    /// New post-request script.
    pub post_request_script: Option<String>,
}

impl RequestUpdate {
    /// Applies the update to a request. The request id never changes.
    pub fn apply_to(&self, request: &mut Request) {
        if let Some(name) = &self.name {
            request.name.clone_from(name);
        }
        if let Some(url) = &self.url {
            request.url.clone_from(url);
        }
        if let Some(method) = self.method {
            request.method = method;
        }
        if let Some(headers) = &self.headers {
            request.headers.clone_from(headers);
        }
        if let Some(body) = &self.body {
            request.body.clone_from(body);
        }
        if let Some(script) = &self.pre_request_script {
            request.pre_request_script.clone_from(script);
        }
        if let Some(script) = &self.post_request_script {
            request.post_request_script.clone_from(script);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collection_json_shape() {
        let mut collection = Collection::new(7, "Users");
        collection.requests.push(Request {
            id: 8,
            name: "List".to_string(),
            url: "${base}/users".to_string(),
            headers: vec![RequestHeader::new("Accept", "application/json")],
            ..Request::default()
        });
        collection
            .variables
            .insert("base".to_string(), "https://api.example.com".to_string());

        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 7,
                "name": "Users",
                "requests": [{
                    "id": 8,
                    "name": "List",
                    "url": "${base}/users",
                    "method": "GET",
                    "headers": [{"name": "Accept", "value": "application/json"}],
                    "body": "",
                    "preRequestScript": "",
                    "postRequestScript": ""
                }],
                "variables": {"base": "https://api.example.com"}
            })
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let collection: Collection =
            serde_json::from_str(r#"{"id": 1, "name": "Bare"}"#).unwrap();
        assert!(collection.requests.is_empty());
        assert!(collection.variables.is_empty());
    }

    #[test]
    fn test_update_keeps_unset_fields() {
        let mut request = Request {
            id: 3,
            name: "Old".to_string(),
            url: "https://a".to_string(),
            ..Request::default()
        };
        let update = RequestUpdate {
            name: Some("New".to_string()),
            method: Some(HttpMethod::Post),
            ..RequestUpdate::default()
        };
        update.apply_to(&mut request);

        assert_eq!(request.id, 3);
        assert_eq!(request.name, "New");
        assert_eq!(request.url, "https://a");
        assert_eq!(request.method, HttpMethod::Post);
    }
}
