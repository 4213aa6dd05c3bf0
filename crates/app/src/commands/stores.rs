//! History, context and storage housekeeping.

use std::process::ExitCode;

use courier_application::{CollectionStorage, ContextStorage, HistoryStorage};
use courier_domain::{HistoryFilter, HistoryItem};

use super::{CommandResult, find_collection};
use crate::cli::HistoryArgs;
use crate::config::Config;

pub(super) async fn history(config: &Config, args: &HistoryArgs) -> CommandResult {
    let data = config.store();
    let mut history = data.history.load().await?;

    if args.clear {
        history.clear();
        data.history.save(&history).await?;
        println!("History cleared");
        return Ok(ExitCode::SUCCESS);
    }

    let entries = history.filter(&filter(args));
    if entries.is_empty() {
        println!("No matching history entries");
    }
    for item in entries {
        println!("{}", format_item(item));
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn context(config: &Config, collection: &str, clear: bool) -> CommandResult {
    let data = config.store();
    let collections = data.collections.load().await?;
    let target = find_collection(&collections, collection)?;
    let mut contexts = data.contexts.load().await?;

    if clear {
        contexts.clear(target.id);
        data.contexts.save(&contexts).await?;
        println!("Context of '{}' cleared", target.name);
        return Ok(ExitCode::SUCCESS);
    }

    let scope = contexts.scope(target.id).cloned().unwrap_or_default();
    println!(
        "{}",
        serde_json::to_string_pretty(&scope).unwrap_or_else(|_| "{}".to_string())
    );
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn storage(config: &Config, clear: bool) -> CommandResult {
    let data = config.store();
    if clear {
        data.clear_all().await?;
        println!("Cleared collections, history and contexts in {}", data.root().display());
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", data.root().display());
    for usage in data.usage().await {
        match usage.bytes {
            Some(bytes) => println!("  {:<18} {bytes} bytes", usage.file),
            None => println!("  {:<18} -", usage.file),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn filter(args: &HistoryArgs) -> HistoryFilter {
    HistoryFilter {
        success: match (args.failed, args.succeeded) {
            (true, _) => Some(false),
            (_, true) => Some(true),
            _ => None,
        },
        method: args.method,
        collection_run: match (args.runs, args.single) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
    }
}

fn format_item(item: &HistoryItem) -> String {
    let status = item
        .status_code
        .map_or_else(|| "---".to_string(), |code| code.to_string());
    let mut line = format!(
        "{} {status} {:<7} {}",
        item.timestamp.format("%Y-%m-%d %H:%M:%S"),
        item.method,
        item.url
    );
    if let (Some(collection), Some(request)) = (&item.collection_name, &item.request_name) {
        line.push_str(&format!("  [{collection} / {request}]"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use courier_domain::HttpMethod;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filter_from_flags() {
        let args = HistoryArgs {
            failed: true,
            runs: true,
            method: Some(HttpMethod::Post),
            ..HistoryArgs::default()
        };
        assert_eq!(
            filter(&args),
            HistoryFilter {
                success: Some(false),
                method: Some(HttpMethod::Post),
                collection_run: Some(true),
            }
        );
        assert_eq!(filter(&HistoryArgs::default()), HistoryFilter::default());
    }

    #[test]
    fn test_format_run_item() {
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let item = HistoryItem::new(1, timestamp, HttpMethod::Get, "http://h/users", 200)
            .in_collection_run("API", "List");
        assert_eq!(
            format_item(&item),
            "2026-01-02 03:04:05 200 GET     http://h/users  [API / List]"
        );
    }
}
