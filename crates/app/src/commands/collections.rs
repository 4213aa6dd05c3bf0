//! Collection management: import, export, listing and editing.

use std::path::Path;
use std::process::ExitCode;

use courier_application::{CollectionStorage, ContextStorage};
use courier_domain::collection::store;
use courier_domain::{Collection, DomainError, RequestDraft, RequestUpdate};
use courier_infrastructure::{CollectionFormat, export_collections, import_collections};
use tracing::info;

use super::{
    CommandError, CommandResult, find_collection, find_request, parse_assignment, parse_header,
};
use crate::cli::{CollectionCommand, RequestCommand, RequestFields};
use crate::config::Config;

pub(super) async fn import(config: &Config, file: &Path) -> CommandResult {
    let text = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CommandError::File {
            path: file.display().to_string(),
            source,
        })?;
    let imported = import_collections(&text)?;

    let data = config.store();
    let existing = data.collections.load().await?;
    let names: Vec<String> = imported.iter().map(|c| c.name.clone()).collect();
    let merged = store::merge_imported(&existing, imported);
    data.collections.save(&merged).await?;

    info!(count = names.len(), file = %file.display(), "collections imported");
    println!("Imported {} collection(s): {}", names.len(), names.join(", "));
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn export(
    config: &Config,
    format: CollectionFormat,
    output: Option<&Path>,
    selected: &[String],
) -> CommandResult {
    let collections = config.store().collections.load().await?;
    let chosen: Vec<Collection> = if selected.is_empty() {
        collections
    } else {
        selected
            .iter()
            .map(|key| find_collection(&collections, key).cloned())
            .collect::<Result<_, _>>()?
    };
    let json = export_collections(&chosen, format)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .map_err(|source| CommandError::File {
                    path: path.display().to_string(),
                    source,
                })?;
            println!(
                "Exported {} collection(s) as {format} to {}",
                chosen.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn list(config: &Config) -> CommandResult {
    let collections = config.store().collections.load().await?;
    if collections.is_empty() {
        println!("No collections. Create one with `courier collection new <name>`.");
    }
    for collection in &collections {
        println!(
            "{} ({} request(s), id {})",
            collection.name,
            collection.requests.len(),
            collection.id
        );
        for request in &collection.requests {
            println!("  {:<7} {}  {}", request.method, request.name, request.url);
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn collection(config: &Config, command: CollectionCommand) -> CommandResult {
    let data = config.store();
    let collections = data.collections.load().await?;

    let updated = match command {
        CollectionCommand::New { name } => {
            let created = store::create_collection(&name);
            store::validate_collection(&created)?;
            println!("Created '{}' (id {})", created.name, created.id);
            let mut updated = collections;
            updated.push(created);
            updated
        }
        CollectionCommand::Rename { collection, name } => {
            let target = find_collection(&collections, &collection)?;
            if name.trim().is_empty() {
                return Err(DomainError::InvalidCollection("missing name".to_string()).into());
            }
            println!("Renamed '{}' to '{}'", target.name, name.trim());
            store::rename_collection(&collections, target.id, &name)
        }
        CollectionCommand::Delete { collection } => {
            let target = find_collection(&collections, &collection)?;
            let id = target.id;
            println!("Deleted '{}'", target.name);

            let mut contexts = data.contexts.load().await?;
            contexts.clear(id);
            data.contexts.save(&contexts).await?;
            store::delete_collection(&collections, id)
        }
    };

    data.collections.save(&updated).await?;
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn request(config: &Config, command: RequestCommand) -> CommandResult {
    let data = config.store();
    let collections = data.collections.load().await?;

    let updated = match command {
        RequestCommand::Add {
            collection,
            name,
            fields,
        } => {
            let target = find_collection(&collections, &collection)?;
            let created = store::create_request(&name, draft(fields)?);
            println!("Added '{}' to '{}' (id {})", created.name, target.name, created.id);
            store::add_request_to_collection(&collections, target.id, created)
        }
        RequestCommand::Edit {
            collection,
            request,
            rename,
            fields,
        } => {
            let target = find_collection(&collections, &collection)?;
            let saved = find_request(target, &request)?;
            let mut changes = update(fields)?;
            changes.name = rename;
            println!("Updated '{}'", saved.name);
            store::update_request_in_collection(&collections, target.id, saved.id, &changes)
        }
        RequestCommand::Delete {
            collection,
            request,
        } => {
            let target = find_collection(&collections, &collection)?;
            let saved = find_request(target, &request)?;
            println!("Deleted '{}' from '{}'", saved.name, target.name);
            store::delete_request_from_collection(&collections, target.id, saved.id)
        }
        RequestCommand::Move {
            collection,
            request,
            target_collection,
            before,
        } => {
            let source = find_collection(&collections, &collection)?;
            let saved = find_request(source, &request)?;
            let target = match &target_collection {
                Some(key) => find_collection(&collections, key)?,
                None => source,
            };
            // Generated ids are never zero, so zero appends.
            let before_id = before
                .as_deref()
                .and_then(|key| find_request(target, key).ok())
                .map_or(0, |r| r.id);
            println!("Moved '{}' to '{}'", saved.name, target.name);
            store::reorder_request(&collections, source.id, target.id, saved.id, before_id)
        }
    };

    data.collections.save(&updated).await?;
    Ok(ExitCode::SUCCESS)
}

pub(super) async fn vars(
    config: &Config,
    collection: &str,
    assignments: &[String],
    unset: &[String],
) -> CommandResult {
    let data = config.store();
    let collections = data.collections.load().await?;
    let target = find_collection(&collections, collection)?;

    if assignments.is_empty() && unset.is_empty() {
        for (key, value) in &store::get_collection_variables(&collections, target.id) {
            println!("{key}={value}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut variables = target.variables.clone();
    for raw in assignments {
        let (key, value) = parse_assignment(raw)?;
        variables.insert(key, value);
    }
    for key in unset {
        variables.remove(key);
    }
    let updated = store::update_collection_variables(&collections, target.id, variables);
    data.collections.save(&updated).await?;
    println!("Updated variables of '{}'", target.name);
    Ok(ExitCode::SUCCESS)
}

fn draft(fields: RequestFields) -> Result<RequestDraft, CommandError> {
    Ok(RequestDraft {
        url: fields.url.unwrap_or_default(),
        method: fields.method.unwrap_or_default(),
        headers: fields
            .headers
            .iter()
            .map(|h| parse_header(h))
            .collect::<Result<_, _>>()?,
        body: fields.body.unwrap_or_default(),
        pre_request_script: fields.pre_request_script.unwrap_or_default(),
        post_request_script: fields.post_request_script.unwrap_or_default(),
    })
}

fn update(fields: RequestFields) -> Result<RequestUpdate, CommandError> {
    let headers = if fields.headers.is_empty() {
        None
    } else {
        Some(
            fields
                .headers
                .iter()
                .map(|h| parse_header(h))
                .collect::<Result<_, _>>()?,
        )
    };
    Ok(RequestUpdate {
        name: None,
        url: fields.url,
        method: fields.method,
        headers,
        body: fields.body,
        pre_request_script: fields.pre_request_script,
        post_request_script: fields.post_request_script,
    })
}
