//! Mapping between Courier collections and Postman v2.1 collections.

use courier_domain::{Collection, Request, RequestHeader, generate_id};

use super::types::{
    POSTMAN_SCHEMA, PostmanBody, PostmanBodyOptions, PostmanCollection, PostmanEvent, PostmanExec,
    PostmanHeader, PostmanInfo, PostmanItem, PostmanRawOptions, PostmanRequest, PostmanScript,
    PostmanUrl, PostmanUrlParts, PostmanUrlStructured, PostmanVariable,
};
use crate::formats::{parse_method, value_to_string};

const PRE_REQUEST_EVENT: &str = "prerequest";
const TEST_EVENT: &str = "test";
const FALLBACK_COLLECTION_NAME: &str = "Imported Collection";
const FALLBACK_REQUEST_NAME: &str = "Untitled Request";

/// Converts a collection to Postman v2.1.
#[must_use]
pub fn to_postman(collection: &Collection) -> PostmanCollection {
    PostmanCollection {
        info: PostmanInfo {
            name: Some(collection.name.clone()),
            postman_id: Some(format!("courier-{}", collection.id)),
            description: Some("Exported from Courier".into()),
            schema: Some(POSTMAN_SCHEMA.to_string()),
        },
        item: collection.requests.iter().map(item_to_postman).collect(),
        variable: collection
            .variables
            .iter()
            .map(|(key, value)| PostmanVariable {
                key: key.clone(),
                value: value.clone().into(),
                var_type: Some("string".to_string()),
                disabled: false,
            })
            .collect(),
    }
}

fn item_to_postman(request: &Request) -> PostmanItem {
    let body = (!request.body.is_empty()).then(|| PostmanBody {
        mode: Some("raw".to_string()),
        raw: Some(request.body.clone()),
        urlencoded: Vec::new(),
        options: Some(PostmanBodyOptions {
            raw: Some(PostmanRawOptions {
                language: Some("json".to_string()),
            }),
        }),
    });

    let event = [
        (PRE_REQUEST_EVENT, &request.pre_request_script),
        (TEST_EVENT, &request.post_request_script),
    ]
    .into_iter()
    .filter(|(_, script)| !script.is_empty())
    .map(|(listen, script)| PostmanEvent {
        listen: listen.to_string(),
        script: Some(PostmanScript {
            script_type: Some("text/javascript".to_string()),
            exec: PostmanExec::Lines(script.split('\n').map(str::to_string).collect()),
        }),
    })
    .collect();

    PostmanItem {
        name: Some(request.name.clone()),
        item: None,
        request: Some(PostmanRequest {
            method: Some(request.method.to_string()),
            header: request
                .headers
                .iter()
                .map(|h| PostmanHeader {
                    key: h.name.clone(),
                    value: Some(h.value.clone()),
                    header_type: Some("text".to_string()),
                    disabled: false,
                })
                .collect(),
            body,
            url: PostmanUrl::Structured(split_url(&request.url)),
        }),
        event,
    }
}

/// Splits a URL into Postman's structured form without validating it, so
/// templated URLs such as `${base}/users` survive.
fn split_url(url: &str) -> PostmanUrlStructured {
    let (protocol, rest) = match url.split_once("://") {
        Some((protocol, rest)) => (protocol, Some(rest)),
        None => (url, None),
    };
    let (host, path): (Vec<String>, Vec<String>) = rest.map_or_else(
        || (Vec::new(), Vec::new()),
        |rest| {
            let mut segments = rest.split('/');
            let host = segments
                .next()
                .map(|h| h.split('.').map(str::to_string).collect())
                .unwrap_or_default();
            (host, segments.map(str::to_string).collect())
        },
    );

    PostmanUrlStructured {
        raw: Some(url.to_string()),
        protocol: Some(protocol.to_string()),
        host: PostmanUrlParts::from(host),
        path: PostmanUrlParts::from(path),
    }
}

/// Converts an imported Postman collection.
///
/// Folders are flattened into the request list; nested request names are
/// prefixed with their folder path joined by `" / "`.
#[must_use]
pub fn from_postman(postman: PostmanCollection) -> Collection {
    let mut requests = Vec::new();
    flatten(&postman.item, None, &mut requests);

    Collection {
        id: generate_id(),
        name: postman
            .info
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FALLBACK_COLLECTION_NAME.to_string()),
        requests,
        variables: postman
            .variable
            .iter()
            .filter(|v| !v.disabled)
            .map(|v| (v.key.clone(), value_to_string(&v.value)))
            .collect(),
    }
}

fn flatten(items: &[PostmanItem], prefix: Option<&str>, out: &mut Vec<Request>) {
    for item in items {
        let name = item
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| FALLBACK_REQUEST_NAME.to_string());
        let name = match prefix {
            Some(prefix) => format!("{prefix} / {name}"),
            None => name,
        };

        match item.children() {
            Some(children) => flatten(children, Some(&name), out),
            None => out.push(request_from_item(item, name)),
        }
    }
}

fn request_from_item(item: &PostmanItem, name: String) -> Request {
    let request = item.request.clone().unwrap_or_default();
    Request {
        id: generate_id(),
        name,
        url: request.url.raw(),
        method: parse_method(request.method.as_deref()),
        headers: request
            .header
            .iter()
            .filter(|h| !h.disabled)
            .map(|h| RequestHeader::new(h.key.clone(), h.value.clone().unwrap_or_default()))
            .collect(),
        body: request.body.as_ref().map(body_text).unwrap_or_default(),
        pre_request_script: item.script(PRE_REQUEST_EVENT),
        post_request_script: item.script(TEST_EVENT),
    }
}

fn body_text(body: &PostmanBody) -> String {
    if body.mode.as_deref() == Some("urlencoded") {
        let pairs: Vec<(&str, &str)> = body
            .urlencoded
            .iter()
            .filter(|p| !p.disabled)
            .map(|p| (p.key.as_str(), p.value.as_deref().unwrap_or_default()))
            .collect();
        return serde_urlencoded::to_string(pairs).unwrap_or_default();
    }
    body.raw.clone().unwrap_or_default()
}
