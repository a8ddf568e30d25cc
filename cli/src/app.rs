//! Application context: unified state passed to every command handler.
//!
//! `AppContext` carries the cross-cutting flags (output mode, quiet,
//! non-interactive) so command signatures stay small.

use thiserror::Error;

use crate::domain::{InputError, ProvisionError};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::ssh::{OpenSshConnector, SshOptions};
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `SIDEKICK_YES` env vars).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode). Always quiet in JSON mode.
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// When `true`, never prompt; missing inputs are errors.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `SIDEKICK_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var_os("CI").is_some() || std::env::var_os("SIDEKICK_YES").is_some();
        let non_interactive = flags.behaviour.yes || ci_env;

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet || flags.output.json),
            mode,
            non_interactive,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Production session connector backed by the system `ssh` client.
    #[must_use]
    pub fn ssh_connector(&self, options: SshOptions) -> OpenSshConnector<TokioCommandRunner> {
        OpenSshConnector::new(TokioCommandRunner::new(), options)
    }
}

/// The operator pressed Ctrl-C.
#[derive(Debug, Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Process exit status for a failed command.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<Interrupted>().is_some() {
        130
    } else {
        1
    }
}

/// Machine-readable code for `--json` error output.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<ProvisionError>() {
        e.cause.code()
    } else if err.downcast_ref::<InputError>().is_some() {
        "input_error"
    } else if err.downcast_ref::<Interrupted>().is_some() {
        "interrupted"
    } else {
        "error"
    }
}
