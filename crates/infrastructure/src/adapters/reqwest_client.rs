//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It sends exactly what the resolved request says: headers with an empty
//! name or value are dropped, and a body goes out only for POST, PUT and
//! PATCH.

use std::collections::BTreeMap;
use std::error::Error as _;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use courier_application::{HttpClient, HttpClientError};
use courier_domain::{HttpMethod, RequestSpec, ResponseSpec, Settings};
use reqwest::{Client, Method};
use tracing::debug;
use url::Url;

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    timeout_ms: u64,
    max_redirects: usize,
}

impl ReqwestHttpClient {
    /// Creates a new HTTP client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::with_settings(&Settings::default())
    }

    /// Creates a client using the timeout, redirect limit and user agent
    /// from `settings`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn with_settings(settings: &Settings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: settings.request_timeout_ms,
            max_redirects: settings.max_redirects,
        })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(&self, error: &reqwest::Error, url: &Url) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout {
                timeout_ms: self.timeout_ms,
            };
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects {
                max: self.max_redirects,
            };
        }

        let message = describe(error);
        if error.is_connect() {
            let host = url.host_str().unwrap_or("unknown").to_string();
            let lower = message.to_lowercase();
            if lower.contains("dns") || lower.contains("resolve") || lower.contains("lookup") {
                return HttpClientError::DnsError { host, message };
            }
            if lower.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host,
                    port: url.port_or_known_default().unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        HttpClientError::Other(message)
    }
}

/// Joins an error with its sources; reqwest keeps the useful part (for
/// example "Connection refused") in the source chain.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Collects response headers; repeated names are joined with `", "`.
fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    collected
}

impl HttpClient for ReqwestHttpClient {
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseSpec, HttpClientError>> + Send + '_>> {
        let method = request.method;
        let url = request.url.clone();
        let headers = request.header_map();
        let body = request.sendable_body().map(str::to_owned);

        Box::pin(async move {
            let parsed =
                Url::parse(&url).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {url}")))?;

            let start = Instant::now();
            let mut builder = self
                .client
                .request(Self::to_reqwest_method(method), parsed.clone());
            for (name, value) in &headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = body {
                builder = builder.body(body);
            }

            debug!(%method, url = %parsed, "sending request");
            let response = builder
                .send()
                .await
                .map_err(|e| self.map_error(&e, &parsed))?;

            let status = response.status().as_u16();
            let response_headers = collect_headers(response.headers());
            let text = response
                .text()
                .await
                .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?;
            let duration = start.elapsed();
            debug!(status, elapsed_ms = duration.as_millis(), "response received");

            Ok(ResponseSpec::new(status, response_headers, text, duration))
        })
    }
}
