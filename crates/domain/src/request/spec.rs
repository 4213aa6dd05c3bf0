//! Resolved request specification

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{HttpMethod, RequestHeader};

/// A fully resolved request, ready to hand to an HTTP transport.
///
/// Placeholders have been substituted and the pre-request script has run;
/// nothing in here is interpreted any further.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute target URL.
    pub url: String,
    /// Headers in their authored order, blank entries included.
    pub headers: Vec<RequestHeader>,
    /// Opaque request body.
    pub body: String,
}

impl RequestSpec {
    /// Creates a new request spec.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Creates a GET request for the given URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Adds a header, returning the modified spec.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(RequestHeader::new(name, value));
        self
    }

    /// Sets the body, returning the modified spec.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the headers that go on the wire.
    ///
    /// Entries with an empty name or value are dropped. A later header with
    /// the same name replaces an earlier one.
    #[must_use]
    pub fn header_map(&self) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .filter(|h| !h.is_blank())
            .map(|h| (h.name.clone(), h.value.clone()))
            .collect()
    }

    /// Returns the body to transmit, if any.
    ///
    /// The body is only sent for POST, PUT and PATCH, and never when empty.
    #[must_use]
    pub fn sendable_body(&self) -> Option<&str> {
        (self.method.has_body() && !self.body.is_empty()).then_some(self.body.as_str())
    }
}
