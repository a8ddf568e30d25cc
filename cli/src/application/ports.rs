//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;

use crate::domain::{SessionError, SidekickConfig, TargetHost};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts local process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program to completion and capture its output. No time limit.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program, killing it once `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned. On timeout the
    /// child is killed and the error wraps `domain::TimeoutError`.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program to completion on the calling thread, discarding output.
    ///
    /// For cleanup from `Drop`, where no runtime is available to await on.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or waited on.
    fn run_blocking(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Remote Session Ports ──────────────────────────────────────────────────────

/// Outcome of a single remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the remote exit status was zero.
    pub success: bool,
    /// Remote exit code, when the command ran to completion.
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr text.
    pub output: String,
}

/// An authenticated connection to one host as one account.
///
/// Not shareable across concurrent call sites; commands run one at a time.
#[allow(async_fn_in_trait)]
pub trait RemoteSession {
    /// Host this session is connected to.
    fn host(&self) -> &TargetHost;
    /// Account this session authenticated as.
    fn account(&self) -> &str;
    /// Run `command` through the remote shell and wait for it to finish.
    async fn execute(&self, command: &str) -> Result<CommandResult, SessionError>;
    /// Release the connection. Safe to call more than once.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Opens authenticated sessions.
#[allow(async_fn_in_trait)]
pub trait SessionConnector {
    type Session: RemoteSession;

    /// Complete a full authentication handshake as `account` on `host`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AuthRejected` or `SessionError::Unreachable`;
    /// never retries.
    async fn open(&self, host: &TargetHost, account: &str) -> Result<Self::Session, SessionError>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Purely observational.
pub trait ProgressReporter {
    /// A phase identified by `label` has begun.
    fn start(&self, label: &str);
    /// Free-form progress within a running phase.
    fn update(&self, label: &str, message: &str);
    /// The phase finished successfully.
    fn success(&self, label: &str, message: &str);
    /// The phase failed.
    fn fail(&self, label: &str, message: &str);
}

// ── Configuration and Input Ports ─────────────────────────────────────────────

/// Abstracts loading and persisting the per-profile configuration file.
pub trait ConfigStore {
    /// Load the configuration, returning defaults if no file exists yet.
    fn load(&self) -> Result<SidekickConfig>;
    /// Write the whole configuration back to durable storage.
    fn persist(&self, config: &SidekickConfig) -> Result<()>;
    /// Location of the backing file, for diagnostics.
    fn path(&self) -> PathBuf;
}

/// Collects operator input values.
pub trait InputCollector {
    /// Return `preset` if non-empty, otherwise ask for `label`.
    ///
    /// `Ok(None)` means no value was provided.
    fn collect(&self, label: &str, preset: Option<&str>) -> Result<Option<String>>;
}
