//! Script engine port

use courier_domain::{ScriptEnv, ScriptError, ScriptRequest, ScriptResponse};

/// Port for running user-supplied pre- and post-request scripts.
///
/// Implementations must treat an empty or whitespace-only script as a no-op
/// and must leave `env.context` untouched when a script fails.
pub trait ScriptEngine: Send + Sync {
    /// Runs a pre-request script, returning the possibly rewritten request.
    ///
    /// # Errors
    ///
    /// Returns a pre-request `ScriptError` when the script fails to parse or
    /// raises an error.
    fn run_pre_request(
        &self,
        script: &str,
        request: ScriptRequest,
        env: ScriptEnv<'_>,
    ) -> Result<ScriptRequest, ScriptError>;

    /// Runs a post-request script for its effect on the context.
    ///
    /// # Errors
    ///
    /// Returns a post-request `ScriptError` when the script fails to parse or
    /// raises an error.
    fn run_post_request(
        &self,
        script: &str,
        response: &ScriptResponse,
        env: ScriptEnv<'_>,
    ) -> Result<(), ScriptError>;
}
