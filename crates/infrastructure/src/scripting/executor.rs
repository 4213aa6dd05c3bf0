//! Script executor for the Courier DSL.
//!
//! Scripts only reach the outside world through the calls listed in
//! [`parser`](super::parser): there is no file, network or process access.
//! `setContext` writes go to a scratch copy of the collection context that
//! replaces the real one only when every statement succeeded.

use courier_application::ScriptEngine;
use courier_domain::{
    ContextMap, Expr, ScriptEnv, ScriptError, ScriptPhase, ScriptRequest, ScriptResponse,
    Statement, Variables,
};
use serde_json::Value;
use tracing::{debug, info};

use super::parser::{number, parse_script};

/// Executes pre-request and post-request scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptExecutor;

impl ScriptExecutor {
    /// Creates a new script executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn run(
        script: &str,
        phase: ScriptPhase,
        target: Target<'_>,
        env: ScriptEnv<'_>,
    ) -> Result<(), ScriptError> {
        let fail = |message: String| ScriptError { phase, message };

        let statements = parse_script(script).map_err(|e| fail(e.to_string()))?;
        debug!(%phase, statements = statements.len(), "running script");

        let mut interpreter = Interpreter {
            target,
            variables: env.variables,
            context: env.context.clone(),
        };
        for statement in &statements {
            interpreter.execute(statement).map_err(fail)?;
        }

        *env.context = interpreter.context;
        Ok(())
    }
}

impl ScriptEngine for ScriptExecutor {
    fn run_pre_request(
        &self,
        script: &str,
        request: ScriptRequest,
        env: ScriptEnv<'_>,
    ) -> Result<ScriptRequest, ScriptError> {
        if script.trim().is_empty() {
            return Ok(request);
        }
        let mut rewritten = request;
        Self::run(script, ScriptPhase::PreRequest, Target::Request(&mut rewritten), env)?;
        Ok(rewritten)
    }

    fn run_post_request(
        &self,
        script: &str,
        response: &ScriptResponse,
        env: ScriptEnv<'_>,
    ) -> Result<(), ScriptError> {
        if script.trim().is_empty() {
            return Ok(());
        }
        Self::run(script, ScriptPhase::PostRequest, Target::Response(response), env)
    }
}

/// What the script operates on.
enum Target<'a> {
    Request(&'a mut ScriptRequest),
    Response(&'a ScriptResponse),
}

struct Interpreter<'a> {
    target: Target<'a>,
    variables: &'a Variables,
    context: ContextMap,
}

impl Interpreter<'_> {
    fn execute(&mut self, statement: &Statement) -> Result<(), String> {
        self.eval(&statement.call).map(drop)
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, String> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => self.lookup(name),
            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                member(&object, property)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                match self.eval(index)? {
                    Value::Number(n) => match (&object, n.as_u64()) {
                        (Value::Array(items), Some(i)) => Ok(usize::try_from(i)
                            .ok()
                            .and_then(|i| items.get(i))
                            .cloned()
                            .unwrap_or(Value::Null)),
                        _ => member(&object, &n.to_string()),
                    },
                    key => member(&object, &to_display(&key)),
                }
            }
            Expr::Add(left, right) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(match (left.as_f64(), right.as_f64()) {
                    (Some(a), Some(b)) if left.is_number() && right.is_number() => number(a + b),
                    _ => Value::String(to_display(&left) + &to_display(&right)),
                })
            }
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(name, &args)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, String> {
        let value = match (&self.target, name) {
            (_, "variables") => Value::Object(
                self.variables
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            (_, "context") => Value::Object(self.context.clone()),
            (Target::Request(request), "url") => Value::String(request.url.clone()),
            (Target::Request(request), "method") => Value::String(request.method.to_string()),
            (Target::Request(request), "body") => Value::String(request.body.clone()),
            (Target::Request(request), "headers") => Value::Object(
                request
                    .headers
                    .iter()
                    .map(|h| (h.name.clone(), Value::String(h.value.clone())))
                    .collect(),
            ),
            (Target::Response(response), "response") => response.body_value(),
            (Target::Response(response), "responseText") => Value::String(response.text.clone()),
            (Target::Response(response), "statusCode") => Value::from(response.status),
            (Target::Response(response), "responseHeaders") => Value::Object(
                response
                    .headers
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect(),
            ),
            _ => return Err(format!("{name} is not defined")),
        };
        Ok(value)
    }

    fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, String> {
        match (&mut self.target, name) {
            (Target::Request(request), "setHeader") => {
                let [header, value] = expect_args::<2>(name, args)?;
                request.set_header(&to_display(header), to_display(value));
                Ok(Value::Null)
            }
            (Target::Request(request), "setUrl") => {
                let [url] = expect_args::<1>(name, args)?;
                request.url = to_display(url);
                Ok(Value::Null)
            }
            (Target::Request(request), "setBody") => {
                let [body] = expect_args::<1>(name, args)?;
                request.body = match body {
                    Value::Object(_) | Value::Array(_) => body.to_string(),
                    other => to_display(other),
                };
                Ok(Value::Null)
            }
            (_, "setContext") => {
                let [key, value] = expect_args::<2>(name, args)?;
                self.context.insert(to_display(key), value.clone());
                Ok(Value::Null)
            }
            (_, "getContext") => {
                let [key] = expect_args::<1>(name, args)?;
                Ok(self
                    .context
                    .get(&to_display(key))
                    .cloned()
                    .unwrap_or(Value::Null))
            }
            (_, "getVariable") => {
                let [key] = expect_args::<1>(name, args)?;
                Ok(self
                    .variables
                    .get(&to_display(key))
                    .map_or(Value::Null, |v| Value::String(v.clone())))
            }
            (Target::Response(response), "getResponseValue") => {
                let [path] = expect_args::<1>(name, args)?;
                Ok(response
                    .value_at(&to_display(path))
                    .cloned()
                    .unwrap_or(Value::Null))
            }
            (Target::Response(response), "getResponseHeader") => {
                let [header] = expect_args::<1>(name, args)?;
                Ok(response
                    .header(&to_display(header))
                    .map_or(Value::Null, |v| Value::String(v.to_string())))
            }
            (_, "JSON.stringify") => {
                let [value] = expect_args::<1>(name, args)?;
                Ok(Value::String(value.to_string()))
            }
            (_, "JSON.parse") => {
                let [text] = expect_args::<1>(name, args)?;
                serde_json::from_str(&to_display(text)).map_err(|e| e.to_string())
            }
            (_, "log" | "console.log") => {
                let line = args.iter().map(to_display).collect::<Vec<_>>().join(" ");
                info!(target: "courier::script", "{line}");
                Ok(Value::Null)
            }
            _ => Err(format!("{name} is not defined")),
        }
    }
}

fn expect_args<'v, const N: usize>(
    name: &str,
    args: &'v [Value],
) -> Result<&'v [Value; N], String> {
    args.try_into().map_err(|_| {
        let plural = if N == 1 { "" } else { "s" };
        format!("{name} expects {N} argument{plural}, got {}", args.len())
    })
}

fn member(object: &Value, property: &str) -> Result<Value, String> {
    match object {
        Value::Null => Err(format!(
            "Cannot read properties of null (reading '{property}')"
        )),
        Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::Null)),
        Value::Array(items) if property == "length" => Ok(Value::from(items.len())),
        Value::String(text) if property == "length" => Ok(Value::from(text.chars().count())),
        _ => Ok(Value::Null),
    }
}

/// Renders a value the way string concatenation shows it.
fn to_display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use courier_domain::{HttpMethod, RequestHeader};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request() -> ScriptRequest {
        ScriptRequest {
            url: "https://api.example.com/users".to_string(),
            method: HttpMethod::Post,
            headers: vec![RequestHeader::new("Accept", "application/json")],
            body: r#"{"name":"ada"}"#.to_string(),
        }
    }

    fn response(body: &str) -> ScriptResponse {
        ScriptResponse {
            text: body.to_string(),
            json: serde_json::from_str(body).ok(),
            headers: BTreeMap::from([("x-request-id".to_string(), "r-1".to_string())]),
            status: 200,
        }
    }

    fn variables() -> Variables {
        BTreeMap::from([("apiKey".to_string(), "k-123".to_string())])
    }

    fn pre(script: &str, context: &mut ContextMap) -> Result<ScriptRequest, ScriptError> {
        let vars = variables();
        ScriptExecutor::new().run_pre_request(script, request(), ScriptEnv::new(&vars, context))
    }

    fn post(script: &str, body: &str, context: &mut ContextMap) -> Result<(), ScriptError> {
        let vars = variables();
        ScriptExecutor::new().run_post_request(
            script,
            &response(body),
            ScriptEnv::new(&vars, context),
        )
    }

    #[test]
    fn test_empty_script_is_passthrough() {
        let mut context = ContextMap::new();
        assert_eq!(pre("   \n  ", &mut context).unwrap(), request());
        post("", "{}", &mut context).unwrap();
        assert!(context.is_empty());
    }

    #[test]
    fn test_set_header_upserts() {
        let mut context = ContextMap::new();
        let rewritten = pre(
            r#"setHeader("Accept", "text/plain")
               setHeader("X-Api-Key", getVariable("apiKey"))"#,
            &mut context,
        )
        .unwrap();
        assert_eq!(
            rewritten.headers,
            vec![
                RequestHeader::new("Accept", "text/plain"),
                RequestHeader::new("X-Api-Key", "k-123"),
            ]
        );
    }

    #[test]
    fn test_set_url_and_body() {
        let mut context = ContextMap::new();
        let rewritten = pre(
            r#"setUrl(url + "?page=" + 2); setBody(JSON.stringify(context))"#,
            &mut context,
        )
        .unwrap();
        assert_eq!(rewritten.url, "https://api.example.com/users?page=2");
        assert_eq!(rewritten.body, "{}");
        assert_eq!(rewritten.method, HttpMethod::Post);
    }

    #[test]
    fn test_context_prefix_and_reads() {
        let mut context = ContextMap::new();
        context.insert("token".to_string(), json!("abc"));
        let rewritten = pre(
            r#"ctx.setHeader("Authorization", "Bearer " + ctx.getContext("token"))"#,
            &mut context,
        )
        .unwrap();
        assert_eq!(rewritten.headers[1].value, "Bearer abc");
    }

    #[test]
    fn test_post_script_extracts_values() {
        let mut context = ContextMap::new();
        post(
            r#"
            setContext("userId", getResponseValue("data.items.0.id"))
            setContext("requestId", getResponseHeader("X-Request-ID"))
            setContext("status", statusCode)
            setContext("name", response.data.name)
            setContext("missing", getResponseValue("data.nope.deeper"))
            "#,
            r#"{"data":{"name":"ada","items":[{"id":7}]}}"#,
            &mut context,
        )
        .unwrap();
        assert_eq!(context.get("userId"), Some(&json!(7)));
        assert_eq!(context.get("requestId"), Some(&json!("r-1")));
        assert_eq!(context.get("status"), Some(&json!(200)));
        assert_eq!(context.get("name"), Some(&json!("ada")));
        assert_eq!(context.get("missing"), Some(&Value::Null));
    }

    #[test]
    fn test_get_context_sees_own_writes() {
        let mut context = ContextMap::new();
        post(
            r#"setContext("a", 1); setContext("b", getContext("a") + 1)"#,
            "{}",
            &mut context,
        )
        .unwrap();
        assert_eq!(context.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_failed_script_commits_nothing() {
        let mut context = ContextMap::new();
        context.insert("keep".to_string(), json!(true));
        let err = post(r#"setContext("a", 1); explode()"#, "{}", &mut context).unwrap_err();

        assert_eq!(err.phase, ScriptPhase::PostRequest);
        assert_eq!(err.to_string(), "Post-request script error: explode is not defined");
        assert_eq!(context.len(), 1);
        assert!(context.get("a").is_none());
    }

    #[test]
    fn test_pre_only_calls_are_undefined_after_response() {
        let mut context = ContextMap::new();
        let err = post(r#"setHeader("a", "b")"#, "{}", &mut context).unwrap_err();
        assert_eq!(err.message, "setHeader is not defined");
    }

    #[test]
    fn test_response_is_undefined_before_request() {
        let mut context = ContextMap::new();
        let err = pre("log(response)", &mut context).unwrap_err();
        assert_eq!(err.to_string(), "Pre-request script error: response is not defined");
    }

    #[test]
    fn test_null_property_access_fails() {
        let mut context = ContextMap::new();
        let err = post("log(response.data.id)", r#"{"other":1}"#, &mut context).unwrap_err();
        assert_eq!(err.message, "Cannot read properties of null (reading 'id')");
    }

    #[test]
    fn test_wrong_argument_count() {
        let mut context = ContextMap::new();
        let err = pre(r#"setUrl()"#, &mut context).unwrap_err();
        assert_eq!(err.message, "setUrl expects 1 argument, got 0");
    }

    #[test]
    fn test_parse_error_becomes_script_error() {
        let mut context = ContextMap::new();
        let err = pre(r#"setHeader("a""#, &mut context).unwrap_err();
        assert_eq!(err.phase, ScriptPhase::PreRequest);
        assert!(err.message.starts_with("Unterminated string"));
    }

    #[test]
    fn test_response_text_when_not_json() {
        let mut context = ContextMap::new();
        post(
            r#"setContext("raw", response); setContext("len", responseText.length)"#,
            "plain",
            &mut context,
        )
        .unwrap();
        assert_eq!(context.get("raw"), Some(&json!("plain")));
        assert_eq!(context.get("len"), Some(&json!(5)));
    }

    #[test]
    fn test_index_access() {
        let mut context = ContextMap::new();
        post(
            r#"setContext("first", response["items"][0]);
               setContext("h", responseHeaders["x-request-id"])"#,
            r#"{"items":["a","b"]}"#,
            &mut context,
        )
        .unwrap();
        assert_eq!(context.get("first"), Some(&json!("a")));
        assert_eq!(context.get("h"), Some(&json!("r-1")));
    }
}
