//! Remote sessions over the system OpenSSH client.
//!
//! Each session owns a multiplexed master connection (`ControlMaster`) whose
//! socket lives in a private temporary directory. Every remote command is a
//! short-lived `ssh` invocation that reuses the master, so authentication
//! happens exactly once per session. Keys come from the operator's agent or
//! default identity files; nothing is ever typed interactively.

use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::application::ports::{CommandResult, CommandRunner, RemoteSession, SessionConnector};
use crate::domain::{SessionError, TargetHost, TimeoutError};

const SSH: &str = "ssh";

/// Exit status `ssh` uses for its own failures, as opposed to the remote command's.
const SSH_TRANSPORT_FAILURE: i32 = 255;

const AUTH_MARKERS: &[&str] = &[
    "Permission denied",
    "Too many authentication failures",
    "Host key verification failed",
];

/// Timeouts applied by an `OpenSshConnector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SshOptions {
    /// Handshake limit passed as `ConnectTimeout`.
    pub connect_timeout: Duration,
    /// Per-command limit. `None` waits indefinitely.
    pub command_timeout: Option<Duration>,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            command_timeout: None,
        }
    }
}

/// Opens `OpenSshSession`s through a `CommandRunner`.
pub struct OpenSshConnector<R: CommandRunner + Clone> {
    runner: R,
    options: SshOptions,
}

impl<R: CommandRunner + Clone> OpenSshConnector<R> {
    pub fn new(runner: R, options: SshOptions) -> Self {
        Self { runner, options }
    }
}

/// Classify a failed handshake from `ssh`'s stderr.
fn handshake_error(host: &TargetHost, account: &str, stderr: &str) -> SessionError {
    let detail = last_line(stderr);
    if AUTH_MARKERS.iter().any(|m| stderr.contains(m)) {
        SessionError::AuthRejected {
            host: host.to_string(),
            account: account.to_string(),
            detail,
        }
    } else {
        SessionError::Unreachable {
            host: host.to_string(),
            account: account.to_string(),
            detail,
        }
    }
}

fn last_line(text: &str) -> String {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("ssh exited without a message")
        .to_string()
}

fn combined_output(out: &Output) -> String {
    let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&out.stderr));
    text
}

impl<R: CommandRunner + Clone> SessionConnector for OpenSshConnector<R> {
    type Session = OpenSshSession<R>;

    async fn open(&self, host: &TargetHost, account: &str) -> Result<Self::Session, SessionError> {
        let unreachable = |detail: String| SessionError::Unreachable {
            host: host.to_string(),
            account: account.to_string(),
            detail,
        };
        let control_dir = tempfile::Builder::new()
            .prefix("sidekick-ssh-")
            .tempdir()
            .map_err(|e| unreachable(format!("cannot create control directory: {e}")))?;
        let control_path = control_dir.path().join("%C");
        let destination = host.destination(account);
        let connect_timeout = format!("ConnectTimeout={}", self.options.connect_timeout.as_secs());
        let control_opt = format!("ControlPath={}", control_path.display());

        debug!(%destination, "opening master connection");
        let args = [
            "-o",
            "ControlMaster=yes",
            "-o",
            control_opt.as_str(),
            "-o",
            "ControlPersist=yes",
            "-o",
            "BatchMode=yes",
            "-o",
            "StrictHostKeyChecking=accept-new",
            "-o",
            connect_timeout.as_str(),
            destination.as_str(),
            "true",
        ];
        let out = self
            .runner
            .run(SSH, &args)
            .await
            .map_err(|e| unreachable(format!("{e:#}")))?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(handshake_error(host, account, &stderr));
        }

        Ok(OpenSshSession {
            runner: self.runner.clone(),
            host: host.clone(),
            account: account.to_string(),
            destination,
            control_path,
            command_timeout: self.options.command_timeout,
            control_dir: Some(control_dir),
        })
    }
}

/// An authenticated master connection to one host as one account.
pub struct OpenSshSession<R: CommandRunner> {
    runner: R,
    host: TargetHost,
    account: String,
    destination: String,
    control_path: PathBuf,
    command_timeout: Option<Duration>,
    /// `None` once the session is closed.
    control_dir: Option<TempDir>,
}

impl<R: CommandRunner> OpenSshSession<R> {
    fn control_opt(&self) -> String {
        format!("ControlPath={}", self.control_path.display())
    }

    fn closed_error(&self) -> SessionError {
        SessionError::Closed {
            host: self.host.to_string(),
            account: self.account.clone(),
        }
    }
}

impl<R: CommandRunner> RemoteSession for OpenSshSession<R> {
    fn host(&self) -> &TargetHost {
        &self.host
    }

    fn account(&self) -> &str {
        &self.account
    }

    async fn execute(&self, command: &str) -> Result<CommandResult, SessionError> {
        if self.control_dir.is_none() {
            return Err(self.closed_error());
        }
        let control_opt = self.control_opt();
        let args = [
            "-o",
            control_opt.as_str(),
            "-o",
            "ControlMaster=no",
            "-o",
            "BatchMode=yes",
            self.destination.as_str(),
            "--",
            command,
        ];
        let result = match self.command_timeout {
            Some(limit) => self.runner.run_with_timeout(SSH, &args, limit).await,
            None => self.runner.run(SSH, &args).await,
        };
        let out = result.map_err(|e| match e.downcast_ref::<TimeoutError>() {
            Some(t) => SessionError::CommandTimeout {
                command: command.to_string(),
                secs: t.secs,
            },
            None => SessionError::Disconnected {
                host: self.host.to_string(),
                command: command.to_string(),
                detail: format!("{e:#}"),
            },
        })?;

        let exit_code = out.status.code();
        if exit_code == Some(SSH_TRANSPORT_FAILURE) {
            return Err(SessionError::Disconnected {
                host: self.host.to_string(),
                command: command.to_string(),
                detail: last_line(&String::from_utf8_lossy(&out.stderr)),
            });
        }
        Ok(CommandResult {
            success: out.status.success(),
            exit_code,
            output: combined_output(&out),
        })
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        let Some(dir) = self.control_dir.take() else {
            return Ok(());
        };
        let control_opt = self.control_opt();
        let args = ["-o", control_opt.as_str(), "-O", "exit", self.destination.as_str()];
        let res = self.runner.run(SSH, &args).await;
        drop(dir);
        match res {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(SessionError::Disconnected {
                host: self.host.to_string(),
                command: "ssh -O exit".to_string(),
                detail: last_line(&String::from_utf8_lossy(&out.stderr)),
            }),
            Err(e) => Err(SessionError::Disconnected {
                host: self.host.to_string(),
                command: "ssh -O exit".to_string(),
                detail: format!("{e:#}"),
            }),
        }
    }
}

impl<R: CommandRunner> Drop for OpenSshSession<R> {
    fn drop(&mut self) {
        let Some(dir) = self.control_dir.take() else {
            return;
        };
        let control_opt = self.control_opt();
        let args = ["-o", control_opt.as_str(), "-O", "exit", self.destination.as_str()];
        match self.runner.run_blocking(SSH, &args) {
            Ok(status) if status.success() => {}
            Ok(status) => {
                warn!(account = %self.account, %status, "master connection left running");
            }
            Err(e) => {
                warn!(account = %self.account, error = %e, "master connection left running");
            }
        }
        drop(dir);
    }
}
