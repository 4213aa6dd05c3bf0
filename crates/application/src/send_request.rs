//! Send Request Use Case
//!
//! Runs the request pipeline for one saved request: interpolate placeholders,
//! run the pre-request script, send, run the post-request script, and record
//! the exchange in history. The collection runner reuses the same steps.

use std::sync::Arc;

use courier_domain::{
    ContextMap, HistoryItem, Request, RequestHistory, RequestSpec, ResponseSpec, ScriptEnv,
    ScriptError, ScriptRequest, ScriptResponse, Variables,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::ports::{CancellationReceiver, Clock, HttpClient, HttpClientError, ScriptEngine};
use crate::variable_resolver::{MissingVariableError, VariableResolver};

/// Error type for the send request use case.
#[derive(Debug, Clone, Error)]
pub enum SendRequestError {
    /// A placeholder could not be resolved.
    #[error(transparent)]
    MissingVariables(#[from] MissingVariableError),

    /// The pre-request script failed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// URL is empty.
    #[error("URL is required")]
    EmptyUrl,

    /// URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP request failed.
    #[error("{0}")]
    Http(#[from] HttpClientError),
}

/// The result of a completed send.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// The request as it went on the wire.
    pub request: RequestSpec,
    /// The received response.
    pub response: ResponseSpec,
    /// Set when the post-request script failed. The send still counts.
    pub post_script_error: Option<ScriptError>,
}

/// Use case for sending a saved request.
///
/// # Example
///
/// ```ignore
/// let engine = Arc::new(DslScriptEngine::new());
/// let use_case = SendRequest::new(Arc::new(client), engine, Arc::new(SystemClock));
/// let outcome = use_case
///     .send(&request, &collection.variables, &mut context, &mut history, None)
///     .await?;
/// ```
pub struct SendRequest<C: HttpClient, S: ScriptEngine> {
    client: Arc<C>,
    scripts: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<C: HttpClient, S: ScriptEngine> SendRequest<C, S> {
    /// Creates a new `SendRequest` use case.
    pub fn new(client: Arc<C>, scripts: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            scripts,
            clock,
        }
    }

    /// Sends a request and records it in history.
    ///
    /// History is only written when a response was received, whatever its
    /// status. Scripts run against `context`; pass a scratch map for requests
    /// that do not belong to a collection.
    ///
    /// # Errors
    ///
    /// Returns `SendRequestError` when interpolation, the pre-request script,
    /// URL validation or the transport fails.
    pub async fn send(
        &self,
        request: &Request,
        variables: &Variables,
        context: &mut ContextMap,
        history: &mut RequestHistory,
        cancel: Option<CancellationReceiver>,
    ) -> Result<SendOutcome, SendRequestError> {
        let spec = self.prepare(request, variables, context)?;
        let response = self.dispatch(&spec, cancel).await?;
        let post_script_error = self.finish(request, &response, variables, context);

        history.add(self.history_item(request, &spec, &response));

        Ok(SendOutcome {
            request: spec,
            response,
            post_script_error,
        })
    }

    /// Resolves placeholders and runs the pre-request script.
    ///
    /// # Errors
    ///
    /// Returns `MissingVariables` or `Script` when the respective step fails.
    pub fn prepare(
        &self,
        request: &Request,
        variables: &Variables,
        context: &mut ContextMap,
    ) -> Result<RequestSpec, SendRequestError> {
        let resolved = VariableResolver::new(variables).resolve_request(request)?;
        let rewritten = self.scripts.run_pre_request(
            &request.pre_request_script,
            ScriptRequest::from(resolved),
            ScriptEnv::new(variables, context),
        )?;
        Ok(RequestSpec::from(rewritten))
    }

    /// Validates the URL and executes the request, racing cancellation.
    ///
    /// # Errors
    ///
    /// Returns `EmptyUrl`, `InvalidUrl` or `Http`; cancellation surfaces as
    /// `Http(HttpClientError::Cancelled)`.
    pub async fn dispatch(
        &self,
        spec: &RequestSpec,
        cancel: Option<CancellationReceiver>,
    ) -> Result<ResponseSpec, SendRequestError> {
        Self::validate(spec)?;
        debug!(method = %spec.method, url = %spec.url, "sending request");

        let Some(mut cancel) = cancel else {
            return Ok(self.client.execute(spec).await?);
        };
        if cancel.is_cancelled() {
            return Err(HttpClientError::Cancelled.into());
        }
        tokio::select! {
            result = self.client.execute(spec) => result.map_err(SendRequestError::from),
            () = cancel.cancelled() => Err(HttpClientError::Cancelled.into()),
        }
    }

    /// Runs the post-request script. Failures are logged and returned, never
    /// propagated.
    pub fn finish(
        &self,
        request: &Request,
        response: &ResponseSpec,
        variables: &Variables,
        context: &mut ContextMap,
    ) -> Option<ScriptError> {
        let result = self.scripts.run_post_request(
            &request.post_request_script,
            &ScriptResponse::from(response),
            ScriptEnv::new(variables, context),
        );
        match result {
            Ok(()) => None,
            Err(error) => {
                warn!(request = %request.name, %error, "post-request script failed");
                Some(error)
            }
        }
    }

    /// Builds the history entry for a received response.
    #[must_use]
    pub fn history_item(
        &self,
        request: &Request,
        spec: &RequestSpec,
        response: &ResponseSpec,
    ) -> HistoryItem {
        HistoryItem::new(
            courier_domain::generate_id(),
            self.clock.now(),
            spec.method,
            spec.url.clone(),
            response.status,
        )
        .with_payload(spec.headers.clone(), spec.body.clone())
        .with_scripts(
            request.pre_request_script.clone(),
            request.post_request_script.clone(),
        )
    }

    /// Validates the request before execution.
    fn validate(spec: &RequestSpec) -> Result<(), SendRequestError> {
        if spec.url.trim().is_empty() {
            return Err(SendRequestError::EmptyUrl);
        }

        if !spec.url.starts_with("http://") && !spec.url.starts_with("https://") {
            return Err(SendRequestError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }
}
