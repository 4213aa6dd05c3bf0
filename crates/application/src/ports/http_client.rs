//! HTTP Client port
//!
//! The transport is an external collaborator: it takes a resolved
//! [`RequestSpec`] and returns the received [`ResponseSpec`] or a transport
//! error. Non-2xx statuses are responses, not errors.

use std::future::Future;
use std::pin::Pin;

use courier_domain::{RequestSpec, ResponseSpec};
use thiserror::Error;
use tokio::sync::watch;

/// Errors raised by an HTTP transport before a response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpClientError {
    /// The request did not complete in time.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("Could not resolve host '{host}': {message}")]
    DnsError {
        /// The host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The server refused the connection.
    #[error("Connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The redirect limit was exceeded.
    #[error("Too many redirects (max {max})")]
    TooManyRedirects {
        /// Configured redirect limit.
        max: usize,
    },

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request was cancelled.
    #[error("Request cancelled")]
    Cancelled,

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
pub trait HttpClient: Send + Sync {
    /// Executes an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response was received: network failure,
    /// timeout, or an unusable URL.
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseSpec, HttpClientError>> + Send + '_>>;
}

/// Sending half of a cancellation signal.
///
/// Dropping the token does not cancel; only [`CancellationToken::cancel`] does.
#[derive(Debug)]
pub struct CancellationToken {
    sender: watch::Sender<bool>,
}

/// Receiving half of a cancellation signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancellationReceiver {
    receiver: watch::Receiver<bool>,
}

impl CancellationToken {
    /// Creates a linked token and receiver.
    #[must_use]
    pub fn new() -> (Self, CancellationReceiver) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, CancellationReceiver { receiver })
    }

    /// Signals cancellation to every receiver.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Returns a new receiver linked to this token.
    #[must_use]
    pub fn subscribe(&self) -> CancellationReceiver {
        CancellationReceiver {
            receiver: self.sender.subscribe(),
        }
    }
}

impl CancellationReceiver {
    /// Returns true once cancellation has been signalled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Completes when cancellation is signalled.
    ///
    /// Never completes if the token is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
