//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::fmt;

use thiserror::Error;

use crate::domain::state::ProvisionState;

// ── Input errors ──────────────────────────────────────────────────────────────

/// Operator-supplied values that failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("You entered an incorrect IP Address - {0:?}")]
    InvalidAddress(String),

    #[error("An email is needed before you proceed")]
    MissingEmail,

    #[error("Invalid email for TLS certificates: {0:?} (use printable ASCII without spaces, quotes or backslashes)")]
    InvalidEmail(String),

    #[error("No value provided for '{0}' (pass it as a flag or run interactively)")]
    NoValue(String),

    #[error("Could not read '{label}': {detail}")]
    Prompt { label: String, detail: String },
}

// ── Session errors ────────────────────────────────────────────────────────────

/// Failures of the remote shell transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("authentication as '{account}' on {host} was rejected: {detail}")]
    AuthRejected {
        host: String,
        account: String,
        detail: String,
    },

    #[error("cannot reach {host} as '{account}': {detail}")]
    Unreachable {
        host: String,
        account: String,
        detail: String,
    },

    #[error("connection to {host} dropped while running `{command}`: {detail}")]
    Disconnected {
        host: String,
        command: String,
        detail: String,
    },

    #[error("remote command timed out after {secs}s: `{command}`")]
    CommandTimeout { command: String, secs: u64 },

    #[error("session for '{account}' on {host} is already closed")]
    Closed { host: String, account: String },
}

impl SessionError {
    /// Returns `true` for failures raised while establishing the session.
    #[must_use]
    pub fn is_handshake(&self) -> bool {
        matches!(self, Self::AuthRejected { .. } | Self::Unreachable { .. })
    }
}

/// Raised by a command runner when a process exceeds its time budget.
#[derive(Debug, Error)]
#[error("{program} timed out after {secs}s")]
pub struct TimeoutError {
    pub program: String,
    pub secs: u64,
}

// ── Stage errors ──────────────────────────────────────────────────────────────

/// A command inside a stage exited non-zero.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("stage '{stage}' failed at command {} of {total}: `{command}`", .index + 1)]
pub struct StageFailure {
    /// Display name of the stage.
    pub stage: String,
    /// Zero-based position of the failing command.
    pub index: usize,
    /// Number of commands in the stage.
    pub total: usize,
    /// The failing command line.
    pub command: String,
    /// Combined stdout/stderr captured from the failing command.
    pub output: String,
}

/// Why a stage stopped before its last command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error(transparent)]
    CommandFailed(StageFailure),

    #[error("stage '{stage}' aborted at command {}: {source}", .index + 1)]
    Transport {
        stage: String,
        index: usize,
        #[source]
        source: SessionError,
    },
}

// ── Extraction errors ─────────────────────────────────────────────────────────

/// A fact could not be located in captured command output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("marker {marker:?} not found in command output")]
    MarkerNotFound { marker: String },

    #[error("marker {marker:?} is not followed by a value")]
    MissingValue { marker: String },
}

// ── Persistence errors ────────────────────────────────────────────────────────

/// The local configuration could not be written after remote setup finished.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error(
    "the host is configured but local settings were not saved to {path}: {detail}\n\
     Add these values manually:\n  serverAddress: {server_address}\n  certEmail: {cert_email}\n  publicKey: {public_key}"
)]
pub struct PersistenceError {
    pub path: String,
    pub detail: String,
    pub server_address: String,
    pub cert_email: String,
    pub public_key: String,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },
}

// ── Provisioning run ──────────────────────────────────────────────────────────

/// Root cause of a failed provisioning run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FailureCause {
    #[error(transparent)]
    Authentication(SessionError),

    #[error(transparent)]
    Stage(StageError),

    #[error(transparent)]
    Session(SessionError),

    #[error(transparent)]
    Extraction(ExtractionError),

    #[error(transparent)]
    Persistence(PersistenceError),
}

impl FailureCause {
    /// Short machine-readable code, used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "authentication_error",
            Self::Stage(_) => "stage_failure",
            Self::Session(SessionError::CommandTimeout { .. }) => "command_timeout",
            Self::Session(_) => "session_error",
            Self::Extraction(_) => "extraction_error",
            Self::Persistence(_) => "persistence_error",
        }
    }
}

/// A provisioning run halted before `Complete`.
///
/// `failed_at` is the state the run was trying to reach; `reached` lists the
/// states that were entered before the failure, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionError {
    pub failed_at: ProvisionState,
    pub cause: FailureCause,
    pub reached: Vec<ProvisionState>,
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.failed_at.description(), self.cause)
    }
}

/// `Display` already carries the full cause, so no source chain is exposed.
impl std::error::Error for ProvisionError {}
