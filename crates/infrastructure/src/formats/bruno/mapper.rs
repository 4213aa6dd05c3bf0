//! Mapping between Courier collections and Bruno collections.

use courier_domain::{Collection, Request, RequestHeader, Variables, generate_id};
use serde_json::Value;

use super::types::{
    BrunoAuth, BrunoBody, BrunoCollection, BrunoConfig, BrunoEnvironment, BrunoHeader, BrunoItem,
    BrunoRequest, BrunoScript, BrunoVariable,
};
use crate::formats::{first_non_empty, parse_method, value_to_string};

const BRUNO_VERSION: &str = "1";
const FALLBACK_COLLECTION_NAME: &str = "Imported Collection";
const ENVIRONMENT_NAME: &str = "Collection Variables";

/// Converts a collection to Bruno.
#[must_use]
pub fn to_bruno(collection: &Collection) -> BrunoCollection {
    BrunoCollection {
        version: Some(Value::String(BRUNO_VERSION.to_string())),
        name: Some(collection.name.clone()),
        items: collection
            .requests
            .iter()
            .zip(1..)
            .map(|(request, seq)| item_to_bruno(request, seq))
            .collect(),
        environments: environment_to_bruno(&collection.variables)
            .into_iter()
            .collect(),
        bruno_config: Some(BrunoConfig {
            version: Some(BRUNO_VERSION.to_string()),
            name: Some(collection.name.clone()),
            config_type: Some("collection".to_string()),
        }),
    }
}

fn item_to_bruno(request: &Request, seq: u32) -> BrunoItem {
    let body = if request.body.is_empty() {
        BrunoBody {
            mode: "none".to_string(),
            ..BrunoBody::default()
        }
    } else {
        BrunoBody {
            mode: "json".to_string(),
            json: Some(request.body.clone()),
            ..BrunoBody::default()
        }
    };

    BrunoItem {
        item_type: BrunoItem::HTTP.to_string(),
        name: request.name.clone(),
        seq: Some(seq),
        request: Some(BrunoRequest {
            url: request.url.clone(),
            method: Some(request.method.to_string()),
            headers: request
                .headers
                .iter()
                .map(|h| BrunoHeader {
                    name: Some(h.name.clone()),
                    key: None,
                    value: Some(h.value.clone()),
                    enabled: true,
                })
                .collect(),
            params: Vec::new(),
            body: Some(body),
            script: Some(BrunoScript {
                req: Some(request.pre_request_script.clone()),
                res: Some(request.post_request_script.clone()),
            }),
            tests: Some(request.post_request_script.clone()),
            auth: Some(BrunoAuth {
                mode: "none".to_string(),
            }),
        }),
        items: Vec::new(),
    }
}

/// Collection variables travel as the first (and only) environment.
fn environment_to_bruno(variables: &Variables) -> Option<BrunoEnvironment> {
    (!variables.is_empty()).then(|| BrunoEnvironment {
        name: ENVIRONMENT_NAME.to_string(),
        variables: variables
            .iter()
            .map(|(name, value)| BrunoVariable {
                name: Some(name.clone()),
                key: None,
                value: Value::String(value.clone()),
                enabled: true,
            })
            .collect(),
    })
}

/// Converts an imported Bruno collection.
///
/// Variables come from the first environment. Folders are flattened into
/// the request list; nested request names are prefixed with their folder
/// path joined by `" / "`.
#[must_use]
pub fn from_bruno(bruno: BrunoCollection) -> Collection {
    let mut requests = Vec::new();
    flatten(&bruno.items, None, &mut requests);

    let name = first_non_empty([
        bruno.name.as_deref(),
        bruno.bruno_config.as_ref().and_then(|c| c.name.as_deref()),
        Some(FALLBACK_COLLECTION_NAME),
    ]);

    let variables = bruno
        .environments
        .first()
        .map(|env| {
            env.variables
                .iter()
                .filter(|v| v.enabled)
                .filter_map(|v| {
                    let name = v.name.as_ref().or(v.key.as_ref())?;
                    Some((name.clone(), value_to_string(&v.value)))
                })
                .collect()
        })
        .unwrap_or_default();

    Collection {
        id: generate_id(),
        name,
        requests,
        variables,
    }
}

fn flatten(items: &[BrunoItem], prefix: Option<&str>, out: &mut Vec<Request>) {
    for item in items {
        let name = match prefix {
            Some(prefix) => format!("{prefix} / {}", item.name),
            None => item.name.clone(),
        };
        match item.item_type.as_str() {
            BrunoItem::HTTP => out.push(request_from_item(item, name)),
            BrunoItem::FOLDER => flatten(&item.items, Some(&name), out),
            _ => {}
        }
    }
}

fn request_from_item(item: &BrunoItem, name: String) -> Request {
    let request = item.request.clone().unwrap_or_default();
    let body = request.body.as_ref().map_or_else(String::new, |b| {
        first_non_empty([b.json.as_deref(), b.text.as_deref(), b.raw.as_deref()])
    });
    let script = request.script.unwrap_or_default();

    Request {
        id: generate_id(),
        name,
        url: request.url,
        method: parse_method(request.method.as_deref()),
        headers: request
            .headers
            .iter()
            .filter(|h| h.enabled)
            .map(|h| {
                let name = h.name.as_ref().or(h.key.as_ref()).cloned().unwrap_or_default();
                RequestHeader::new(name, h.value.clone().unwrap_or_default())
            })
            .collect(),
        body,
        pre_request_script: script.req.unwrap_or_default(),
        post_request_script: first_non_empty([script.res.as_deref(), request.tests.as_deref()]),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use courier_domain::HttpMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(value: Value) -> Collection {
        from_bruno(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_export_shape() {
        let mut collection = Collection::new(3, "Shop");
        collection.requests.push(Request {
            id: 1,
            name: "List".to_string(),
            url: "http://shop/items".to_string(),
            headers: vec![RequestHeader::new("Accept", "application/json")],
            ..Request::default()
        });
        collection.requests.push(Request {
            id: 2,
            name: "Create".to_string(),
            method: HttpMethod::Post,
            body: "{}".to_string(),
            post_request_script: "log(1)".to_string(),
            ..Request::default()
        });

        let value = serde_json::to_value(to_bruno(&collection)).unwrap();
        assert_eq!(value["version"], "1");
        assert_eq!(
            value["brunoConfig"],
            json!({"version": "1", "name": "Shop", "type": "collection"})
        );
        assert_eq!(value["environments"], json!([]));

        let first = &value["items"][0];
        assert_eq!(first["type"], "http");
        assert_eq!(first["seq"], 1);
        assert_eq!(
            first["request"]["headers"],
            json!([{"name": "Accept", "value": "application/json", "enabled": true}])
        );
        assert_eq!(
            first["request"]["body"],
            json!({"mode": "none", "formUrlEncoded": [], "multipartForm": []})
        );
        assert_eq!(first["request"]["auth"], json!({"mode": "none"}));

        let second = &value["items"][1];
        assert_eq!(second["seq"], 2);
        assert_eq!(second["request"]["body"]["json"], "{}");
        assert_eq!(second["request"]["script"], json!({"req": "", "res": "log(1)"}));
        assert_eq!(second["request"]["tests"], "log(1)");
    }

    #[test]
    fn test_export_variables_as_environment() {
        let mut collection = Collection::new(3, "Shop");
        collection.variables.insert("host".to_string(), "shop.local".to_string());
        let value = serde_json::to_value(to_bruno(&collection)).unwrap();
        assert_eq!(
            value["environments"][0]["variables"],
            json!([{"name": "host", "value": "shop.local", "enabled": true}])
        );
    }

    #[test]
    fn test_import_flattens_nested_folders() {
        let collection = parse(json!({
            "version": "1",
            "name": "Shop",
            "items": [
                {"type": "folder", "name": "Orders", "items": [
                    {"type": "http", "name": "List",
                     "request": {"url": "http://x/orders", "method": "GET"}},
                    {"type": "folder", "name": "Admin", "items": [
                        {"type": "http", "name": "Purge",
                         "request": {"url": "http://x/purge", "method": "DELETE"}}
                    ]}
                ]},
                {"type": "http", "name": "Ping", "request": {"url": "http://x/ping"}}
            ]
        }));
        let names: Vec<_> = collection.requests.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Orders / List", "Orders / Admin / Purge", "Ping"]);
        assert_eq!(collection.requests[1].method, HttpMethod::Delete);
        assert_eq!(collection.requests[2].method, HttpMethod::Get);
    }

    #[test]
    fn test_import_name_fallbacks() {
        let from_config = parse(json!({"items": [], "brunoConfig": {"name": "Configured"}}));
        assert_eq!(from_config.name, "Configured");

        let fallback = parse(json!({"items": [], "version": "1"}));
        assert_eq!(fallback.name, "Imported Collection");
    }

    #[test]
    fn test_import_body_scripts_and_variables() {
        let collection = parse(json!({
            "version": "1",
            "name": "S",
            "items": [{"type": "http", "name": "r", "request": {
                "url": "${host}/x",
                "method": "POST",
                "headers": [
                    {"key": "Legacy", "value": "1"},
                    {"name": "Off", "value": "0", "enabled": false}
                ],
                "body": {"mode": "text", "json": "", "text": "hello"},
                "script": {"req": "log(1)"},
                "tests": "log(2)"
            }}],
            "environments": [
                {"name": "dev", "variables": [
                    {"name": "host", "value": "http://dev"},
                    {"key": "port", "value": 80}
                ]},
                {"name": "prod", "variables": [{"name": "host", "value": "http://prod"}]}
            ]
        }));
        let request = &collection.requests[0];
        assert_eq!(request.body, "hello");
        assert_eq!(request.headers, vec![RequestHeader::new("Legacy", "1")]);
        assert_eq!(request.pre_request_script, "log(1)");
        assert_eq!(request.post_request_script, "log(2)");
        assert_eq!(collection.variables["host"], "http://dev");
        assert_eq!(collection.variables["port"], "80");
    }
}
