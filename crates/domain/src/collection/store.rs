//! Pure state transitions over the list of collections.
//!
//! Every function borrows the current list and returns a new one; nothing is
//! mutated in place. Operations naming a collection or request that does not
//! exist return the input unchanged.

use std::collections::HashSet;

use super::model::{Collection, Request, RequestDraft, RequestUpdate, Variables};
use crate::error::{DomainError, DomainResult};
use crate::id::generate_id;

/// Creates a new empty collection with a fresh id.
#[must_use]
pub fn create_collection(name: &str) -> Collection {
    Collection::new(generate_id(), name.trim())
}

/// Creates a new request with a fresh id from editor data.
#[must_use]
pub fn create_request(name: &str, draft: RequestDraft) -> Request {
    Request {
        id: generate_id(),
        name: name.trim().to_string(),
        url: draft.url,
        method: draft.method,
        headers: draft.headers,
        body: draft.body,
        pre_request_script: draft.pre_request_script,
        post_request_script: draft.post_request_script,
    }
}

fn map_collection<F>(collections: &[Collection], collection_id: i64, f: F) -> Vec<Collection>
where
    F: FnOnce(&mut Collection),
{
    let mut updated = collections.to_vec();
    if let Some(collection) = updated.iter_mut().find(|c| c.id == collection_id) {
        f(collection);
    }
    updated
}

/// Appends a request to the end of a collection.
#[must_use]
pub fn add_request_to_collection(
    collections: &[Collection],
    collection_id: i64,
    request: Request,
) -> Vec<Collection> {
    map_collection(collections, collection_id, |c| c.requests.push(request))
}

/// Applies a partial update to one request.
#[must_use]
pub fn update_request_in_collection(
    collections: &[Collection],
    collection_id: i64,
    request_id: i64,
    update: &RequestUpdate,
) -> Vec<Collection> {
    map_collection(collections, collection_id, |c| {
        if let Some(request) = c.requests.iter_mut().find(|r| r.id == request_id) {
            update.apply_to(request);
        }
    })
}

/// Removes one request from a collection.
#[must_use]
pub fn delete_request_from_collection(
    collections: &[Collection],
    collection_id: i64,
    request_id: i64,
) -> Vec<Collection> {
    map_collection(collections, collection_id, |c| {
        c.requests.retain(|r| r.id != request_id);
    })
}

/// Renames a collection. The new name is trimmed.
#[must_use]
pub fn rename_collection(
    collections: &[Collection],
    collection_id: i64,
    new_name: &str,
) -> Vec<Collection> {
    map_collection(collections, collection_id, |c| {
        c.name = new_name.trim().to_string();
    })
}

/// Removes a collection.
#[must_use]
pub fn delete_collection(collections: &[Collection], collection_id: i64) -> Vec<Collection> {
    collections
        .iter()
        .filter(|c| c.id != collection_id)
        .cloned()
        .collect()
}

/// Replaces a collection's variables wholesale.
#[must_use]
pub fn update_collection_variables(
    collections: &[Collection],
    collection_id: i64,
    variables: Variables,
) -> Vec<Collection> {
    map_collection(collections, collection_id, |c| c.variables = variables)
}

/// Moves a request to the position just before `target_request_id` in the
/// target collection, or to its end when that id is not present.
///
/// Source and target may be the same collection. Nothing changes when the
/// source collection, the request, or the target collection is missing.
#[must_use]
pub fn reorder_request(
    collections: &[Collection],
    source_collection_id: i64,
    target_collection_id: i64,
    request_id: i64,
    target_request_id: i64,
) -> Vec<Collection> {
    let Some(request) = get_collection_by_id(collections, source_collection_id)
        .and_then(|c| c.request(request_id))
        .cloned()
    else {
        return collections.to_vec();
    };
    if get_collection_by_id(collections, target_collection_id).is_none() {
        return collections.to_vec();
    }

    let mut updated = collections.to_vec();
    if let Some(source) = updated.iter_mut().find(|c| c.id == source_collection_id) {
        source.requests.retain(|r| r.id != request_id);
    }
    if let Some(target) = updated.iter_mut().find(|c| c.id == target_collection_id) {
        match target
            .requests
            .iter()
            .position(|r| r.id == target_request_id)
        {
            Some(index) => target.requests.insert(index, request),
            None => target.requests.push(request),
        }
    }
    updated
}

/// Finds a collection by id.
#[must_use]
pub fn get_collection_by_id(collections: &[Collection], collection_id: i64) -> Option<&Collection> {
    collections.iter().find(|c| c.id == collection_id)
}

/// Returns a collection's variables, or an empty scope when it does not exist.
#[must_use]
pub fn get_collection_variables(collections: &[Collection], collection_id: i64) -> Variables {
    get_collection_by_id(collections, collection_id)
        .map(|c| c.variables.clone())
        .unwrap_or_default()
}

/// Checks the structural requirements of a collection.
///
/// # Errors
///
/// Returns `DomainError::InvalidCollection` when the id is zero, the name is
/// blank, or two requests share an id.
pub fn validate_collection(collection: &Collection) -> DomainResult<()> {
    if collection.id == 0 {
        return Err(DomainError::InvalidCollection("missing id".to_string()));
    }
    if collection.name.trim().is_empty() {
        return Err(DomainError::InvalidCollection("missing name".to_string()));
    }
    let mut seen = HashSet::new();
    for request in &collection.requests {
        if !seen.insert(request.id) {
            return Err(DomainError::InvalidCollection(format!(
                "duplicate request id {} in '{}'",
                request.id, collection.name
            )));
        }
    }
    Ok(())
}

/// Appends imported collections to the existing list.
///
/// Imported collections whose id is already taken (by an existing or an
/// earlier imported collection) receive a fresh id, keeping ids unique.
#[must_use]
pub fn merge_imported(collections: &[Collection], imported: Vec<Collection>) -> Vec<Collection> {
    let mut taken: HashSet<i64> = collections.iter().map(|c| c.id).collect();
    let mut merged = collections.to_vec();
    for mut collection in imported {
        if !taken.insert(collection.id) {
            collection.id = generate_id();
            taken.insert(collection.id);
        }
        merged.push(collection);
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;
    use pretty_assertions::assert_eq;

    fn request(id: i64, name: &str) -> Request {
        Request {
            id,
            name: name.to_string(),
            url: format!("https://api.example.com/{name}"),
            ..Request::default()
        }
    }

    fn sample() -> Vec<Collection> {
        let mut a = Collection::new(1, "A");
        a.requests = vec![request(10, "x"), request(11, "y"), request(12, "z")];
        let mut b = Collection::new(2, "B");
        b.requests = vec![request(20, "p"), request(21, "q")];
        vec![a, b]
    }

    fn names(collection: &Collection) -> Vec<&str> {
        collection.requests.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_create_collection_trims_name() {
        let collection = create_collection("  Payments  ");
        assert_eq!(collection.name, "Payments");
        assert!(collection.requests.is_empty());
        assert!(collection.variables.is_empty());
        assert!(collection.id > 0);
    }

    #[test]
    fn test_create_request_copies_draft() {
        let draft = RequestDraft {
            url: "https://a".to_string(),
            method: HttpMethod::Put,
            body: "{}".to_string(),
            ..RequestDraft::default()
        };
        let req = create_request(" Save ", draft);
        assert_eq!(req.name, "Save");
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.body, "{}");
    }

    #[test]
    fn test_add_request_appends() {
        let updated = add_request_to_collection(&sample(), 2, request(22, "r"));
        assert_eq!(names(&updated[1]), vec!["p", "q", "r"]);
        assert_eq!(names(&updated[0]), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_update_request_merges_fields() {
        let update = RequestUpdate {
            url: Some("https://new".to_string()),
            ..RequestUpdate::default()
        };
        let updated = update_request_in_collection(&sample(), 1, 11, &update);
        let req = updated[0].request(11).unwrap();
        assert_eq!(req.url, "https://new");
        assert_eq!(req.name, "y");
    }

    #[test]
    fn test_delete_request() {
        let updated = delete_request_from_collection(&sample(), 1, 11);
        assert_eq!(names(&updated[0]), vec!["x", "z"]);
    }

    #[test]
    fn test_rename_collection_trims() {
        let updated = rename_collection(&sample(), 2, "  Renamed ");
        assert_eq!(updated[1].name, "Renamed");
    }

    #[test]
    fn test_delete_nonexistent_collection_is_noop() {
        let input = sample();
        let updated = delete_collection(&input, 999);
        assert_eq!(updated, input);
    }

    #[test]
    fn test_operations_on_missing_ids_are_noops() {
        let input = sample();
        assert_eq!(add_request_to_collection(&input, 9, request(1, "n")), input);
        assert_eq!(
            update_request_in_collection(&input, 1, 999, &RequestUpdate::default()),
            input
        );
        assert_eq!(delete_request_from_collection(&input, 1, 999), input);
        assert_eq!(rename_collection(&input, 9, "n"), input);
        assert_eq!(update_collection_variables(&input, 9, Variables::new()), input);
        assert_eq!(reorder_request(&input, 1, 9, 10, 20), input);
        assert_eq!(reorder_request(&input, 1, 2, 999, 20), input);
    }

    #[test]
    fn test_update_variables_replaces_wholesale() {
        let mut first = Variables::new();
        first.insert("a".to_string(), "1".to_string());
        first.insert("b".to_string(), "2".to_string());
        let updated = update_collection_variables(&sample(), 1, first);

        let mut second = Variables::new();
        second.insert("c".to_string(), "3".to_string());
        let updated = update_collection_variables(&updated, 1, second.clone());

        assert_eq!(get_collection_variables(&updated, 1), second);
    }

    #[test]
    fn test_get_collection_variables_of_missing_collection_is_empty() {
        assert!(get_collection_variables(&sample(), 42).is_empty());
    }

    #[test]
    fn test_reorder_within_collection_preserves_others() {
        let updated = reorder_request(&sample(), 1, 1, 12, 10);
        assert_eq!(names(&updated[0]), vec!["z", "x", "y"]);
        assert_eq!(updated[0].requests.len(), 3);
        assert_eq!(names(&updated[1]), vec!["p", "q"]);
    }

    #[test]
    fn test_reorder_appends_when_target_missing() {
        let updated = reorder_request(&sample(), 1, 1, 10, 999);
        assert_eq!(names(&updated[0]), vec!["y", "z", "x"]);
    }

    #[test]
    fn test_reorder_across_collections() {
        let updated = reorder_request(&sample(), 1, 2, 11, 21);
        assert_eq!(names(&updated[0]), vec!["x", "z"]);
        assert_eq!(names(&updated[1]), vec!["p", "y", "q"]);
    }

    #[test]
    fn test_validate_collection() {
        let input = sample();
        assert!(validate_collection(&input[0]).is_ok());

        let blank = Collection::new(5, "  ");
        assert!(validate_collection(&blank).is_err());

        let mut duplicate = Collection::new(6, "Dup");
        duplicate.requests = vec![request(1, "a"), request(1, "b")];
        assert!(validate_collection(&duplicate).is_err());
    }

    #[test]
    fn test_merge_imported_reassigns_colliding_ids() {
        let existing = sample();
        let imported = vec![Collection::new(1, "Clash"), Collection::new(3, "Fresh")];
        let merged = merge_imported(&existing, imported);

        assert_eq!(merged.len(), 4);
        let ids: HashSet<i64> = merged.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(merged[3].id, 3);
        assert_ne!(merged[2].id, 1);
        assert_eq!(merged[2].name, "Clash");
    }
}
