//! Response specification type
//!
//! Contains the data received from an HTTP call: status code, headers,
//! body text and timing.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Returns the canonical reason phrase for a status code.
///
/// Codes without a registered phrase yield `"Unknown Status"`.
#[must_use]
pub const fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        511 => "Network Authentication Required",
        _ => "Unknown Status",
    }
}

/// HTTP response specification.
///
/// Header names are stored lower-cased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: u16,
    /// Response headers keyed by lower-cased name.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Response body as text.
    pub body: String,
    /// Response time.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ResponseSpec {
    /// Creates a new `ResponseSpec`, normalising header names to lower case.
    #[must_use]
    pub fn new<I, K, V>(
        status: u16,
        headers: I,
        body: impl Into<String>,
        duration: Duration,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        Self {
            status,
            headers,
            body: body.into(),
            duration,
        }
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the reason phrase for the status code.
    #[must_use]
    pub const fn status_text(&self) -> &'static str {
        status_text(self.status)
    }

    /// Looks up a header by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Returns true when the response declares a JSON content type.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.contains("application/json"))
    }

    /// Parses the body as JSON, if it is valid JSON.
    #[must_use]
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Returns the body for display.
    ///
    /// JSON responses are re-indented with two spaces; anything else is
    /// returned unchanged.
    #[must_use]
    pub fn display_body(&self) -> String {
        if self.is_json() {
            if let Some(value) = self.json() {
                if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                    return pretty;
                }
            }
        }
        self.body.clone()
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn response(status: u16, content_type: &str, body: &str) -> ResponseSpec {
        ResponseSpec::new(
            status,
            [("Content-Type", content_type)],
            body,
            Duration::from_millis(12),
        )
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(200), "OK");
        assert_eq!(status_text(418), "I'm a teapot");
        assert_eq!(status_text(599), "Unknown Status");
    }

    #[test]
    fn test_is_ok_covers_2xx_only() {
        assert!(response(200, "text/plain", "").is_ok());
        assert!(response(204, "text/plain", "").is_ok());
        assert!(!response(301, "text/plain", "").is_ok());
        assert!(!response(404, "text/plain", "").is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let resp = response(200, "application/json", "{}");
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn test_display_body_pretty_prints_json() {
        let resp = response(200, "application/json; charset=utf-8", r#"{"a":1}"#);
        assert_eq!(resp.display_body(), "{\n  \"a\": 1\n}");

        let text = response(200, "text/plain", r#"{"a":1}"#);
        assert_eq!(text.display_body(), r#"{"a":1}"#);
    }

    #[test]
    fn test_display_body_keeps_key_order() {
        let resp = response(200, "application/json", r#"{"zeta":1,"alpha":{"b":2,"a":3}}"#);
        assert_eq!(
            resp.display_body(),
            "{\n  \"zeta\": 1,\n  \"alpha\": {\n    \"b\": 2,\n    \"a\": 3\n  }\n}"
        );
    }
}
