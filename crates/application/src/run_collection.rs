//! Collection Runner
//!
//! Executes every request of a collection in order. Each step runs the full
//! pipeline (interpolate, pre-request script, send, post-request script,
//! record) before the next one starts, so context written by step N is
//! visible to step N+1. The run stops at the first failing step.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use courier_domain::{
    Collection, ContextMap, Request, RequestHistory, RunResult, RunState, RunStatus,
};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ports::{CancellationReceiver, Clock, HttpClient, HttpClientError, ScriptEngine};
use crate::send_request::{SendRequest, SendRequestError};

const CANCELLED_MESSAGE: &str = "Run cancelled";

/// Error type for starting a collection run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// The collection already has a run in progress.
    #[error("Collection '{name}' is already running")]
    AlreadyRunning {
        /// Id of the collection.
        collection_id: i64,
        /// Name of the collection.
        name: String,
    },
}

/// Receives run progress as it happens.
pub trait RunObserver: Send {
    /// Called once for every recorded result, in execution order.
    fn on_result(&mut self, result: &RunResult);

    /// Called on every lifecycle transition.
    fn on_state(&mut self, _state: RunState) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn on_result(&mut self, _result: &RunResult) {}
}

impl RunObserver for Vec<RunResult> {
    fn on_result(&mut self, result: &RunResult) {
        self.push(result.clone());
    }
}

impl RunObserver for UnboundedSender<RunResult> {
    fn on_result(&mut self, result: &RunResult) {
        // A closed channel means nobody is watching; the run goes on.
        let _ = self.send(result.clone());
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// The collection that ran.
    pub collection_id: i64,
    /// Final state: `Completed` or `Aborted`.
    pub state: RunState,
    /// One result per executed request, in order.
    pub results: Vec<RunResult>,
}

impl RunReport {
    /// Returns true when every request ran and succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == RunState::Completed
    }
}

/// Removes the collection from the running set when the run ends.
struct RunGuard {
    running: Arc<Mutex<HashSet<i64>>>,
    collection_id: i64,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.collection_id);
    }
}

/// Outcome of a single step.
struct Step {
    result: RunResult,
    stop: bool,
}

/// Sequential, fail-fast collection runner.
pub struct CollectionRunner<C: HttpClient, S: ScriptEngine> {
    pipeline: SendRequest<C, S>,
    running: Arc<Mutex<HashSet<i64>>>,
}

impl<C: HttpClient, S: ScriptEngine> CollectionRunner<C, S> {
    /// Creates a runner sharing the given adapters.
    pub fn new(client: Arc<C>, scripts: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pipeline: SendRequest::new(client, scripts, clock),
            running: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Returns true while the collection has a run in progress.
    #[must_use]
    pub fn is_running(&self, collection_id: i64) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&collection_id)
    }

    fn acquire(&self, collection: &Collection) -> Result<RunGuard, RunError> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if !running.insert(collection.id) {
            return Err(RunError::AlreadyRunning {
                collection_id: collection.id,
                name: collection.name.clone(),
            });
        }
        Ok(RunGuard {
            running: Arc::clone(&self.running),
            collection_id: collection.id,
        })
    }

    /// Runs every request of `collection` in order.
    ///
    /// `context` is the collection's own context scope; it is borrowed
    /// exclusively for the whole run. Every received response is appended to
    /// `history`. Each result is handed to `observer` as soon as it is
    /// recorded. Cancellation is checked before each request and raced
    /// against the HTTP call.
    ///
    /// # Errors
    ///
    /// Returns `RunError::AlreadyRunning` if this runner is already running
    /// the same collection.
    pub async fn run(
        &self,
        collection: &Collection,
        context: &mut ContextMap,
        history: &mut RequestHistory,
        observer: &mut dyn RunObserver,
        cancel: Option<CancellationReceiver>,
    ) -> Result<RunReport, RunError> {
        let _guard = self.acquire(collection)?;
        let run_id = Uuid::now_v7();
        info!(
            %run_id,
            collection = %collection.name,
            requests = collection.requests.len(),
            "collection run started"
        );
        observer.on_state(RunState::Running);

        let mut results = Vec::with_capacity(collection.requests.len());
        let mut state = RunState::Completed;

        for request in &collection.requests {
            let step = if cancel.as_ref().is_some_and(CancellationReceiver::is_cancelled) {
                Step {
                    result: RunResult::failure(
                        &request.name,
                        RunStatus::Cancelled,
                        CANCELLED_MESSAGE,
                    ),
                    stop: true,
                }
            } else {
                self.run_step(collection, request, context, history, cancel.clone())
                    .await
            };

            info!(
                %run_id,
                request = %request.name,
                status = %step.result.status,
                success = step.result.success,
                "step finished"
            );
            observer.on_result(&step.result);
            results.push(step.result);

            if step.stop {
                state = RunState::Aborted;
                break;
            }
        }

        if state == RunState::Aborted {
            warn!(%run_id, executed = results.len(), "collection run aborted");
        } else {
            info!(%run_id, executed = results.len(), "collection run completed");
        }
        observer.on_state(state);

        Ok(RunReport {
            run_id,
            collection_id: collection.id,
            state,
            results,
        })
    }

    async fn run_step(
        &self,
        collection: &Collection,
        request: &Request,
        context: &mut ContextMap,
        history: &mut RequestHistory,
        cancel: Option<CancellationReceiver>,
    ) -> Step {
        let failure = |status, message: String| Step {
            result: RunResult::failure(&request.name, status, message),
            stop: true,
        };

        let spec = match self
            .pipeline
            .prepare(request, &collection.variables, context)
        {
            Ok(spec) => spec,
            Err(SendRequestError::MissingVariables(e)) => {
                return failure(RunStatus::VariableError, e.to_string());
            }
            Err(e) => return failure(RunStatus::ScriptError, e.to_string()),
        };

        let response = match self.pipeline.dispatch(&spec, cancel).await {
            Ok(response) => response,
            Err(SendRequestError::Http(HttpClientError::Cancelled)) => {
                return failure(RunStatus::Cancelled, CANCELLED_MESSAGE.to_string());
            }
            Err(e) => return failure(RunStatus::Error, e.to_string()),
        };

        self.pipeline
            .finish(request, &response, &collection.variables, context);

        history.add(
            self.pipeline
                .history_item(request, &spec, &response)
                .in_collection_run(&collection.name, &request.name),
        );

        let success = response.is_ok();
        Step {
            result: RunResult::http(
                &request.name,
                response.status,
                success,
                &response.display_body(),
            ),
            stop: !success,
        }
    }
}
