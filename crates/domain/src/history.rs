//! Request History Domain Model
//!
//! A bounded, chronological log of executed requests. Appending beyond the
//! limit evicts the oldest entries first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::{HttpMethod, RequestHeader};

/// Number of entries kept when no other limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// A single executed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Unique identifier for this entry.
    pub id: i64,
    /// When the request was executed.
    pub timestamp: DateTime<Utc>,
    /// The URL that was requested.
    pub url: String,
    /// HTTP method used.
    pub method: HttpMethod,
    /// Headers that were sent.
    #[serde(default)]
    pub headers: Vec<RequestHeader>,
    /// Body that was sent.
    #[serde(default)]
    pub body: String,
    /// Response status code, when one was received.
    pub status_code: Option<u16>,
    /// Whether the status was 2xx.
    pub success: bool,
    /// Owning collection, for collection runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    /// Request name, for collection runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_name: Option<String>,
    /// Whether this entry was produced by a collection run.
    #[serde(default)]
    pub is_collection_run: bool,
    /// Pre-request script of the request.
    #[serde(default)]
    pub pre_request_script: String,
    /// Post-request script of the request.
    #[serde(default)]
    pub post_request_script: String,
}

impl HistoryItem {
    /// Creates an entry for an individually sent request.
    #[must_use]
    pub fn new(
        id: i64,
        timestamp: DateTime<Utc>,
        method: HttpMethod,
        url: impl Into<String>,
        status_code: u16,
    ) -> Self {
        Self {
            id,
            timestamp,
            url: url.into(),
            method,
            headers: Vec::new(),
            body: String::new(),
            status_code: Some(status_code),
            success: (200..300).contains(&status_code),
            collection_name: None,
            request_name: None,
            is_collection_run: false,
            pre_request_script: String::new(),
            post_request_script: String::new(),
        }
    }

    /// Attaches the headers and body that were sent.
    #[must_use]
    pub fn with_payload(mut self, headers: Vec<RequestHeader>, body: impl Into<String>) -> Self {
        self.headers = headers;
        self.body = body.into();
        self
    }

    /// Attaches the scripts of the request.
    #[must_use]
    pub fn with_scripts(mut self, pre: impl Into<String>, post: impl Into<String>) -> Self {
        self.pre_request_script = pre.into();
        self.post_request_script = post.into();
        self
    }

    /// Marks the entry as one step of a collection run.
    #[must_use]
    pub fn in_collection_run(
        mut self,
        collection_name: impl Into<String>,
        request_name: impl Into<String>,
    ) -> Self {
        self.collection_name = Some(collection_name.into());
        self.request_name = Some(request_name.into());
        self.is_collection_run = true;
        self
    }
}

/// Predicate used to query the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Keep only entries whose success flag matches.
    pub success: Option<bool>,
    /// Keep only entries sent with this method.
    pub method: Option<HttpMethod>,
    /// Keep only entries whose collection-run flag matches.
    pub collection_run: Option<bool>,
}

impl HistoryFilter {
    /// Returns true when the entry satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, item: &HistoryItem) -> bool {
        self.success.is_none_or(|s| item.success == s)
            && self.method.is_none_or(|m| item.method == m)
            && self
                .collection_run
                .is_none_or(|r| item.is_collection_run == r)
    }
}

/// Request history with a maximum size limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestHistory {
    /// History entries, oldest first.
    entries: VecDeque<HistoryItem>,
    /// Maximum number of entries to keep.
    #[serde(default = "default_max_entries")]
    max_entries: usize,
}

const fn default_max_entries() -> usize {
    DEFAULT_HISTORY_LIMIT
}

impl Default for RequestHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl RequestHistory {
    /// Creates a new empty history. A limit of zero is raised to one.
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Appends an entry, evicting the oldest ones beyond the limit.
    pub fn add(&mut self, item: HistoryItem) {
        self.entries.push_back(item);
        self.trim();
    }

    /// Changes the limit, evicting the oldest entries if needed.
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries.max(1);
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Returns the configured limit.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Returns the entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryItem> {
        self.entries.iter()
    }

    /// Finds an entry by id.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&HistoryItem> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the entries matching a filter, oldest first.
    #[must_use]
    pub fn filter(&self, filter: &HistoryFilter) -> Vec<&HistoryItem> {
        self.entries.iter().filter(|e| filter.matches(e)).collect()
    }

    /// Returns the entries whose success flag equals `success`.
    #[must_use]
    pub fn filter_by_success(&self, success: bool) -> Vec<&HistoryItem> {
        self.filter(&HistoryFilter {
            success: Some(success),
            ..HistoryFilter::default()
        })
    }

    /// Returns the entries sent with `method`.
    #[must_use]
    pub fn filter_by_method(&self, method: HttpMethod) -> Vec<&HistoryItem> {
        self.filter(&HistoryFilter {
            method: Some(method),
            ..HistoryFilter::default()
        })
    }

    /// Returns the entries whose collection-run flag equals `collection_runs`.
    #[must_use]
    pub fn filter_by_collection_runs(&self, collection_runs: bool) -> Vec<&HistoryItem> {
        self.filter(&HistoryFilter {
            collection_run: Some(collection_runs),
            ..HistoryFilter::default()
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(id: i64, method: HttpMethod, status: u16) -> HistoryItem {
        HistoryItem::new(id, Utc::now(), method, format!("https://api.example.com/{id}"), status)
    }

    #[test]
    fn test_success_flag_follows_status() {
        assert!(item(1, HttpMethod::Get, 200).success);
        assert!(item(1, HttpMethod::Get, 299).success);
        assert!(!item(1, HttpMethod::Get, 302).success);
        assert!(!item(1, HttpMethod::Get, 500).success);
    }

    #[test]
    fn test_appending_51st_item_evicts_oldest() {
        let mut history = RequestHistory::default();
        for id in 1..=51 {
            history.add(item(id, HttpMethod::Get, 200));
        }

        assert_eq!(history.len(), 50);
        let ids: Vec<i64> = history.entries().map(|e| e.id).collect();
        assert_eq!(ids, (2..=51).collect::<Vec<_>>());
        assert!(history.get(1).is_none());
    }

    #[test]
    fn test_shrinking_limit_evicts_oldest() {
        let mut history = RequestHistory::new(10);
        for id in 1..=5 {
            history.add(item(id, HttpMethod::Get, 200));
        }
        history.set_max_entries(2);
        let ids: Vec<i64> = history.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn test_filters() {
        let mut history = RequestHistory::default();
        history.add(item(1, HttpMethod::Get, 200));
        history.add(item(2, HttpMethod::Post, 500));
        history.add(item(3, HttpMethod::Post, 201).in_collection_run("C", "create"));

        let ok: Vec<i64> = history.filter_by_success(true).iter().map(|e| e.id).collect();
        assert_eq!(ok, vec![1, 3]);

        let posts: Vec<i64> = history
            .filter_by_method(HttpMethod::Post)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(posts, vec![2, 3]);

        let runs: Vec<i64> = history
            .filter_by_collection_runs(true)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(runs, vec![3]);

        let combined = history.filter(&HistoryFilter {
            success: Some(false),
            method: Some(HttpMethod::Post),
            collection_run: Some(false),
        });
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].id, 2);
    }

    #[test]
    fn test_clear() {
        let mut history = RequestHistory::default();
        history.add(item(1, HttpMethod::Get, 200));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_item_json_shape() {
        let item = item(5, HttpMethod::Get, 404).in_collection_run("Users", "Get user");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["statusCode"], 404);
        assert_eq!(value["success"], false);
        assert_eq!(value["isCollectionRun"], true);
        assert_eq!(value["collectionName"], "Users");
        assert_eq!(value["requestName"], "Get user");
        assert!(value["timestamp"].as_str().unwrap().contains('T'));
    }
}
