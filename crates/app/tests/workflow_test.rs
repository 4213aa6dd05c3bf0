//! End-to-end tests for collection runs, import/export and persistence.
//!
//! These wire the real script executor, format converters and file stores
//! together; only the HTTP transport is replaced by a canned client.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

use courier_application::{
    CollectionRunner, CollectionStorage, ContextStorage, HistoryStorage, HttpClient,
    HttpClientError, NoopObserver, SendRequest,
};
use courier_domain::collection::store;
use courier_domain::{
    Collection, ContextMap, ContextStore, HttpMethod, RequestDraft, RequestHeader,
    RequestHistory, RequestSpec, ResponseSpec, RunResult, RunState, RunStatus,
};
use courier_infrastructure::{
    CollectionFormat, DataStore, ScriptExecutor, SystemClock, export_collections,
    import_collections,
};

/// Answers requests from a queue and records what was sent.
struct CannedClient {
    responses: Mutex<Vec<(u16, String)>>,
    sent: Mutex<Vec<RequestSpec>>,
}

impl CannedClient {
    fn new(responses: &[(u16, &str)]) -> Self {
        let mut queue: Vec<_> = responses
            .iter()
            .map(|(status, body)| (*status, (*body).to_string()))
            .collect();
        queue.reverse();
        Self {
            responses: Mutex::new(queue),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<RequestSpec> {
        self.sent.lock().unwrap().clone()
    }
}

impl HttpClient for CannedClient {
    fn execute(
        &self,
        request: &RequestSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ResponseSpec, HttpClientError>> + Send + '_>> {
        self.sent.lock().unwrap().push(request.clone());
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or((200, "{}".to_string()));
        Box::pin(async move {
            Ok(ResponseSpec::new(
                status,
                [("Content-Type", "application/json")],
                body,
                Duration::from_millis(3),
            ))
        })
    }
}

fn runner(client: &Arc<CannedClient>) -> CollectionRunner<CannedClient, ScriptExecutor> {
    CollectionRunner::new(
        Arc::clone(client),
        Arc::new(ScriptExecutor::new()),
        Arc::new(SystemClock::new()),
    )
}

fn auth_flow() -> Collection {
    let collections = vec![store::create_collection("Auth flow")];
    let id = collections[0].id;
    let collections = store::update_collection_variables(
        &collections,
        id,
        [("base".to_string(), "http://api.test".to_string())].into(),
    );
    let login = store::create_request(
        "Login",
        RequestDraft {
            url: "${base}/login".to_string(),
            method: HttpMethod::Post,
            headers: vec![RequestHeader::new("Content-Type", "application/json")],
            body: r#"{"user": "ada"}"#.to_string(),
            post_request_script: r#"setContext("token", getResponseValue("auth.token"))"#
                .to_string(),
            ..RequestDraft::default()
        },
    );
    let profile = store::create_request(
        "Profile",
        RequestDraft {
            url: "${base}/me".to_string(),
            pre_request_script: r#"setHeader("Authorization", "Bearer " + getContext("token"))"#
                .to_string(),
            ..RequestDraft::default()
        },
    );
    let collections = store::add_request_to_collection(&collections, id, login);
    let collections = store::add_request_to_collection(&collections, id, profile);
    collections.into_iter().next().unwrap()
}

#[tokio::test]
async fn test_run_chains_context_between_requests() {
    let client = Arc::new(CannedClient::new(&[
        (200, r#"{"auth": {"token": "abc"}}"#),
        (200, r#"{"name": "Ada"}"#),
    ]));
    let collection = auth_flow();
    let mut context = ContextMap::new();
    let mut history = RequestHistory::default();
    let mut results: Vec<RunResult> = Vec::new();

    let report = runner(&client)
        .run(&collection, &mut context, &mut history, &mut results, None)
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Completed);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(context.get("token"), Some(&json!("abc")));

    let sent = client.sent();
    assert_eq!(sent[0].url, "http://api.test/login");
    assert_eq!(sent[1].url, "http://api.test/me");
    assert!(
        sent[1]
            .headers
            .contains(&RequestHeader::new("Authorization", "Bearer abc"))
    );

    assert_eq!(history.len(), 2);
    assert!(history.entries().all(|item| item.is_collection_run));
}

#[tokio::test]
async fn test_run_stops_at_first_failing_status() {
    let client = Arc::new(CannedClient::new(&[
        (200, "{}"),
        (404, r#"{"error": "not found"}"#),
        (200, "{}"),
    ]));
    let mut collection = auth_flow();
    collection.requests.push(store::create_request(
        "Never sent",
        RequestDraft {
            url: "${base}/never".to_string(),
            ..RequestDraft::default()
        },
    ));
    let mut context = ContextMap::new();
    let mut history = RequestHistory::default();
    let mut results: Vec<RunResult> = Vec::new();

    let report = runner(&client)
        .run(&collection, &mut context, &mut history, &mut results, None)
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Aborted);
    assert_eq!(results.len(), 2);
    assert_eq!(results[1].status, RunStatus::Http(404));
    assert!(!results[1].success);
    assert_eq!(client.sent().len(), 2);
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_run_reports_missing_variable_without_sending() {
    let client = Arc::new(CannedClient::new(&[]));
    let mut collection = auth_flow();
    collection.variables.clear();
    let mut context = ContextMap::new();
    let mut history = RequestHistory::default();
    let mut results: Vec<RunResult> = Vec::new();

    let report = runner(&client)
        .run(&collection, &mut context, &mut history, &mut results, None)
        .await
        .unwrap();

    assert_eq!(report.state, RunState::Aborted);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, RunStatus::VariableError);
    assert_eq!(
        results[0].response,
        "Variable 'base' not found in variables object"
    );
    assert!(client.sent().is_empty());
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_single_send_uses_collection_context() {
    let client = Arc::new(CannedClient::new(&[(200, r#"{"id": 7}"#)]));
    let collection = auth_flow();
    let mut context = ContextMap::new();
    context.insert("token".to_string(), json!("saved"));
    let mut history = RequestHistory::default();

    let use_case = SendRequest::new(
        Arc::clone(&client),
        Arc::new(ScriptExecutor::new()),
        Arc::new(SystemClock::new()),
    );
    let profile = collection.request_by_name("Profile").unwrap();
    let outcome = use_case
        .send(profile, &collection.variables, &mut context, &mut history, None)
        .await
        .unwrap();

    assert!(outcome.response.is_ok());
    assert!(outcome.post_script_error.is_none());
    assert!(
        outcome
            .request
            .headers
            .contains(&RequestHeader::new("Authorization", "Bearer saved"))
    );
    let item = history.entries().next().unwrap();
    assert!(!item.is_collection_run);
    assert_eq!(item.status_code, Some(200));
}

#[tokio::test]
async fn test_run_state_survives_reload() {
    let dir = tempdir().expect("Failed to create temp directory");
    let data = DataStore::open(dir.path());

    let collection = auth_flow();
    data.collections
        .save(std::slice::from_ref(&collection))
        .await
        .unwrap();

    let client = Arc::new(CannedClient::new(&[(200, r#"{"auth": {"token": "t1"}}"#)]));
    let mut contexts = ContextStore::new();
    let mut history = RequestHistory::new(10);
    runner(&client)
        .run(
            &collection,
            contexts.scope_mut(collection.id),
            &mut history,
            &mut NoopObserver,
            None,
        )
        .await
        .unwrap();
    data.history.save(&history).await.unwrap();
    data.contexts.save(&contexts).await.unwrap();

    let reopened = DataStore::open(dir.path());
    assert_eq!(reopened.collections.load().await.unwrap(), vec![collection.clone()]);
    assert_eq!(reopened.history.load().await.unwrap(), history);
    assert_eq!(
        reopened.contexts.load().await.unwrap().get(collection.id, "token"),
        Some(&json!("t1"))
    );
}

#[tokio::test]
async fn test_postman_import_then_bruno_export() {
    let postman = json!({
        "info": {
            "name": "Shop",
            "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
        },
        "item": [
            {
                "name": "Orders",
                "item": [{
                    "name": "List",
                    "request": {
                        "method": "GET",
                        "url": "${base}/orders",
                        "header": [{"key": "Accept", "value": "application/json"}]
                    }
                }]
            },
            {
                "name": "Create",
                "request": {
                    "method": "POST",
                    "url": {"raw": "${base}/orders"},
                    "body": {"mode": "raw", "raw": "{\"sku\": 1}"}
                }
            }
        ],
        "variable": [{"key": "base", "value": "http://shop.test"}]
    });

    let imported = import_collections(&postman.to_string()).unwrap();
    assert_eq!(imported.len(), 1);
    let shop = &imported[0];
    assert_eq!(shop.name, "Shop");
    let names: Vec<_> = shop.requests.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Orders / List", "Create"]);
    assert_eq!(shop.variables.get("base").map(String::as_str), Some("http://shop.test"));

    let dir = tempdir().unwrap();
    let data = DataStore::open(dir.path());
    let merged = store::merge_imported(&[], imported.clone());
    data.collections.save(&merged).await.unwrap();
    let stored = data.collections.load().await.unwrap();

    let bruno = export_collections(&stored, CollectionFormat::Bruno).unwrap();
    let exported: serde_json::Value = serde_json::from_str(&bruno).unwrap();
    assert!(exported.is_object(), "a single collection exports as an object");

    let back = import_collections(&bruno).unwrap();
    assert_eq!(back[0].name, "Shop");
    assert_eq!(back[0].variables, shop.variables);
    let requests: Vec<_> = back[0]
        .requests
        .iter()
        .map(|r| (r.name.as_str(), r.method, r.url.as_str(), r.body.as_str()))
        .collect();
    assert_eq!(
        requests,
        vec![
            ("Orders / List", HttpMethod::Get, "${base}/orders", ""),
            ("Create", HttpMethod::Post, "${base}/orders", "{\"sku\": 1}"),
        ]
    );
}

#[tokio::test]
async fn test_clear_all_keeps_settings() {
    let dir = tempdir().unwrap();
    let data = DataStore::open(dir.path());
    data.collections.save(&[auth_flow()]).await.unwrap();
    let settings = courier_domain::Settings {
        history_limit: 3,
        ..courier_domain::Settings::default()
    };
    data.settings.save(&settings).await.unwrap();

    data.clear_all().await.unwrap();

    assert!(data.collections.load().await.unwrap().is_empty());
    assert_eq!(data.settings.load().await.unwrap(), settings);
}
