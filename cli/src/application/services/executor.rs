//! Command executor: runs one remote command line over an open session.

use tracing::debug;

use crate::application::ports::{CommandResult, RemoteSession};
use crate::domain::SessionError;

/// What to keep from a command's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Await completion; output is dropped unless the command failed.
    Discard,
    /// Return the full combined output to the caller.
    Capture,
}

/// Run `command` on `session` and wait for it to finish.
///
/// There is no time limit here; any timeout is a property of the session.
///
/// # Errors
///
/// Returns a `SessionError` if the transport fails. A command that runs and
/// exits non-zero is *not* an error: it comes back with `success == false`.
pub async fn execute(
    session: &impl RemoteSession,
    command: &str,
    mode: OutputMode,
) -> Result<CommandResult, SessionError> {
    debug!(account = session.account(), host = %session.host(), command, "executing");
    let mut result = session.execute(command).await?;
    debug!(success = result.success, exit_code = ?result.exit_code, "command finished");
    if mode == OutputMode::Discard && result.success {
        result.output.clear();
    }
    Ok(result)
}
