use fnpack_core::RuntimeConfig;

use crate::executor::CommandExecutor;

/// Strips surrounding whitespace and one leading `v` from a version string.
///
/// ```
/// use fnpack_exec::version::strip_version_prefix;
///
/// assert_eq!(strip_version_prefix("v18.19.0\n"), "18.19.0");
/// assert_eq!(strip_version_prefix("20.11.1"), "20.11.1");
/// ```
pub fn strip_version_prefix(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed).trim()
}

/// Asks the runtime binary for its version, falling back to
/// `runtime.default_version` when the query fails for any reason.
pub async fn runtime_version<E: CommandExecutor>(executor: &E, runtime: &RuntimeConfig) -> String {
    let args = vec!["-v".to_owned()];
    match executor
        .exec(&runtime.program, &args, runtime.version_timeout())
        .await
    {
        Ok(output) => {
            let version = strip_version_prefix(&output);
            if version.is_empty() {
                tracing::debug!(program = %runtime.program, "empty version output, using default");
                runtime.default_version.clone()
            } else {
                version.to_owned()
            }
        }
        Err(e) => {
            tracing::debug!(program = %runtime.program, error = %e, "version query failed, using default");
            runtime.default_version.clone()
        }
    }
}
