//! Stage runner: executes a stage's commands in order over one session.
//!
//! Stops at the first failing command. Commands that already ran are not
//! rolled back; a rerun relies on each command being safe to repeat.

use tracing::{debug, warn};

use crate::application::ports::{ProgressReporter, RemoteSession};
use crate::application::services::executor::{self, OutputMode};
use crate::domain::{Stage, StageError, StageFailure};

/// Run every command of `stage` on `session`, reporting under `stage.name()`.
///
/// Does not call `start`/`success`/`fail` on the reporter; the caller owns
/// the phase lifecycle and only per-command updates are emitted here.
///
/// # Errors
///
/// Returns `StageError::CommandFailed` with the failing command's position
/// and output, or `StageError::Transport` if the session broke mid-stage.
pub async fn run_stage(
    stage: &Stage,
    session: &impl RemoteSession,
    reporter: &impl ProgressReporter,
) -> Result<(), StageError> {
    let total = stage.commands().len();
    for (index, command) in stage.commands().iter().enumerate() {
        reporter.update(stage.name(), &format!("step {}/{total}", index + 1));
        debug!(stage = stage.name(), index, "running stage command");

        let result = executor::execute(session, command, OutputMode::Discard)
            .await
            .map_err(|source| StageError::Transport {
                stage: stage.name().to_string(),
                index,
                source,
            })?;

        if !result.success {
            warn!(
                stage = stage.name(),
                index,
                exit_code = ?result.exit_code,
                "stage command failed"
            );
            return Err(StageError::CommandFailed(StageFailure {
                stage: stage.name().to_string(),
                index,
                total,
                command: command.clone(),
                output: result.output,
            }));
        }
    }
    Ok(())
}
