//! Collection run results and lifecycle.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum number of body characters kept in a [`RunResult`].
pub const RESPONSE_PREVIEW_CHARS: usize = 200;

/// Lifecycle of a collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Not started.
    #[default]
    Idle,
    /// Executing requests.
    Running,
    /// Every request ran and succeeded.
    Completed,
    /// Stopped at a failing step or by cancellation.
    Aborted,
}

/// Outcome class of one step of a collection run.
///
/// Serialises as the numeric HTTP status, or as one of the strings
/// `"Variable Error"`, `"Script Error"`, `"Error"` and `"Cancelled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// An HTTP response was received with this status code.
    Http(u16),
    /// A placeholder could not be resolved.
    VariableError,
    /// The pre-request script failed.
    ScriptError,
    /// The transport failed before a response arrived.
    Error,
    /// The run was cancelled while this step was pending.
    Cancelled,
}

impl RunStatus {
    const VARIABLE_ERROR: &'static str = "Variable Error";
    const SCRIPT_ERROR: &'static str = "Script Error";
    const ERROR: &'static str = "Error";
    const CANCELLED: &'static str = "Cancelled";
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "{code}"),
            Self::VariableError => f.write_str(Self::VARIABLE_ERROR),
            Self::ScriptError => f.write_str(Self::SCRIPT_ERROR),
            Self::Error => f.write_str(Self::ERROR),
            Self::Cancelled => f.write_str(Self::CANCELLED),
        }
    }
}

impl Serialize for RunStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Http(code) => serializer.serialize_u16(*code),
            other => serializer.collect_str(other),
        }
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u16),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Ok(Self::Http(code)),
            Raw::Text(text) => match text.as_str() {
                Self::VARIABLE_ERROR => Ok(Self::VariableError),
                Self::SCRIPT_ERROR => Ok(Self::ScriptError),
                Self::ERROR => Ok(Self::Error),
                Self::CANCELLED => Ok(Self::Cancelled),
                other => Err(serde::de::Error::custom(format!(
                    "unknown run status: {other}"
                ))),
            },
        }
    }
}

/// Outcome of one request in a collection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Request name.
    pub name: String,
    /// Outcome class.
    pub status: RunStatus,
    /// Whether the step succeeded (2xx response).
    pub success: bool,
    /// Response body preview or error message.
    pub response: String,
}

impl RunResult {
    /// Records a received HTTP response.
    ///
    /// The body is cut to [`RESPONSE_PREVIEW_CHARS`] characters.
    #[must_use]
    pub fn http(name: impl Into<String>, status: u16, success: bool, body: &str) -> Self {
        Self {
            name: name.into(),
            status: RunStatus::Http(status),
            success,
            response: body.chars().take(RESPONSE_PREVIEW_CHARS).collect(),
        }
    }

    /// Records a failed step that produced no response.
    #[must_use]
    pub fn failure(name: impl Into<String>, status: RunStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            success: false,
            response: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_status_serializes_as_number_or_label() {
        assert_eq!(serde_json::to_value(RunStatus::Http(404)).unwrap(), json!(404));
        assert_eq!(
            serde_json::to_value(RunStatus::VariableError).unwrap(),
            json!("Variable Error")
        );
        assert_eq!(
            serde_json::to_value(RunStatus::ScriptError).unwrap(),
            json!("Script Error")
        );
        assert_eq!(serde_json::to_value(RunStatus::Error).unwrap(), json!("Error"));
    }

    #[test]
    fn test_status_deserializes_both_forms() {
        let code: RunStatus = serde_json::from_value(json!(201)).unwrap();
        assert_eq!(code, RunStatus::Http(201));
        let label: RunStatus = serde_json::from_value(json!("Cancelled")).unwrap();
        assert_eq!(label, RunStatus::Cancelled);
        assert!(serde_json::from_value::<RunStatus>(json!("Nope")).is_err());
    }

    #[test]
    fn test_http_result_truncates_body() {
        let body = "x".repeat(500);
        let result = RunResult::http("big", 200, true, &body);
        assert_eq!(result.response.chars().count(), RESPONSE_PREVIEW_CHARS);
    }

    #[test]
    fn test_failure_is_never_successful() {
        let result = RunResult::failure("r", RunStatus::Error, "connection refused");
        assert!(!result.success);
        assert_eq!(result.response, "connection refused");
    }
}
