//! Sending requests: single sends and collection runs.

use std::process::ExitCode;
use std::sync::Arc;

use courier_application::{
    CancellationReceiver, CancellationToken, Clock, CollectionRunner, CollectionStorage,
    ContextStorage, HistoryStorage, RunObserver, SendRequest,
};
use courier_domain::{RequestHistory, RunResult, RunState, RunStatus, Settings};
use courier_infrastructure::{DataStore, ReqwestHttpClient, ScriptExecutor, SystemClock};
use tokio::task::JoinHandle;
use tracing::warn;

use super::{CommandResult, find_collection, find_request};
use crate::config::Config;

/// Prints each run step as it completes.
struct ConsoleObserver;

impl RunObserver for ConsoleObserver {
    fn on_result(&mut self, result: &RunResult) {
        println!("{}", format_result(result));
    }

    fn on_state(&mut self, state: RunState) {
        if state == RunState::Aborted {
            println!("Run aborted.");
        }
    }
}

pub(super) async fn run(config: &Config, collection: &str) -> CommandResult {
    let data = config.store();
    let collections = data.collections.load().await?;
    let target = find_collection(&collections, collection)?;
    let mut history = load_history(&data, &config.settings).await?;
    let mut contexts = data.contexts.load().await?;

    let (client, scripts, clock) = collaborators(&config.settings)?;
    let runner = CollectionRunner::new(client, scripts, clock);

    println!("Running '{}' ({} request(s))", target.name, target.requests.len());
    let (cancel, interrupt) = cancel_on_ctrl_c();
    let report = runner
        .run(
            target,
            contexts.scope_mut(target.id),
            &mut history,
            &mut ConsoleObserver,
            Some(cancel),
        )
        .await;
    interrupt.abort();
    let report = report?;

    // Whatever ran is kept, even for an aborted run.
    data.history.save(&history).await?;
    data.contexts.save(&contexts).await?;

    let passed = report.results.iter().filter(|r| r.success).count();
    println!("{passed}/{} request(s) succeeded", target.requests.len());
    Ok(exit_code(report.succeeded()))
}

pub(super) async fn send(
    config: &Config,
    collection: &str,
    request: &str,
    verbose: bool,
) -> CommandResult {
    let data = config.store();
    let collections = data.collections.load().await?;
    let target = find_collection(&collections, collection)?;
    let saved = find_request(target, request)?;
    let mut history = load_history(&data, &config.settings).await?;
    let mut contexts = data.contexts.load().await?;

    let (client, scripts, clock) = collaborators(&config.settings)?;
    let use_case = SendRequest::new(client, scripts, clock);

    let (cancel, interrupt) = cancel_on_ctrl_c();
    let outcome = use_case
        .send(
            saved,
            &target.variables,
            contexts.scope_mut(target.id),
            &mut history,
            Some(cancel),
        )
        .await;
    interrupt.abort();
    let outcome = outcome?;

    data.history.save(&history).await?;
    data.contexts.save(&contexts).await?;

    let response = &outcome.response;
    println!("{} {}", outcome.request.method, outcome.request.url);
    println!(
        "{} {} ({} ms)",
        response.status,
        response.status_text(),
        response.duration.as_millis()
    );
    if verbose {
        for (name, value) in &response.headers {
            println!("{name}: {value}");
        }
    }
    println!();
    println!("{}", response.display_body());
    if let Some(error) = &outcome.post_script_error {
        println!();
        println!("warning: {error}");
    }
    Ok(exit_code(response.is_ok()))
}

type Collaborators = (Arc<ReqwestHttpClient>, Arc<ScriptExecutor>, Arc<dyn Clock>);

fn collaborators(settings: &Settings) -> Result<Collaborators, super::CommandError> {
    let client = ReqwestHttpClient::with_settings(settings)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    Ok((Arc::new(client), Arc::new(ScriptExecutor::new()), clock))
}

async fn load_history(
    data: &DataStore,
    settings: &Settings,
) -> Result<RequestHistory, super::CommandError> {
    let mut history = data.history.load().await?;
    history.set_max_entries(settings.history_limit);
    Ok(history)
}

/// Cancels the returned receiver on the first Ctrl-C. Abort the handle once
/// the work is done.
fn cancel_on_ctrl_c() -> (CancellationReceiver, JoinHandle<()>) {
    let (token, receiver) = CancellationToken::new();
    let handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            token.cancel();
        }
    });
    (receiver, handle)
}

fn format_result(result: &RunResult) -> String {
    let mark = if result.success { "ok  " } else { "FAIL" };
    let detail = match result.status {
        RunStatus::Http(_) => result.response.lines().next().unwrap_or_default(),
        _ => result.response.as_str(),
    };
    format!("{mark} {} [{}] {detail}", result.name, result.status)
}

const fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_http_result_shows_first_line() {
        let result = RunResult::http("List users", 200, true, "{\n  \"users\": []\n}");
        assert_eq!(format_result(&result), "ok   List users [200] {");
    }

    #[test]
    fn test_format_failure_shows_message() {
        let result = RunResult::failure(
            "Login",
            RunStatus::VariableError,
            "Missing variables: token",
        );
        assert_eq!(
            format_result(&result),
            "FAIL Login [Variable Error] Missing variables: token"
        );
    }
}
