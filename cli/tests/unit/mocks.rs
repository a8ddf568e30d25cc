//! Simulated VPS and in-memory config store for flow tests.
//!
//! `FakeHost` keeps just enough remote state to make the real stage
//! commands meaningful: which accounts exist and whether an age key has
//! been generated. Every open/exec/close is recorded in order.

#![allow(dead_code, clippy::expect_used)]

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use sidekick_cli::application::ports::{
    CommandResult, ConfigStore, ProgressReporter, RemoteSession, SessionConnector,
};
use sidekick_cli::domain::{SessionError, SidekickConfig, TargetHost};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Open(String),
    Exec(String, String),
    Close(String),
}

#[derive(Debug, Default)]
pub struct HostState {
    pub accounts: BTreeSet<String>,
    pub age_key: Option<String>,
    pub keys_generated: usize,
    pub events: Vec<HostEvent>,
    /// Commands containing this text exit 1.
    pub fail_on: Option<String>,
    /// Commands containing this text drop the connection.
    pub drop_on: Option<String>,
}

/// A fresh VPS that only knows `root`.
#[derive(Clone)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn fresh() -> Self {
        let mut state = HostState::default();
        state.accounts.insert("root".to_string());
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn failing_on(self, pattern: &str) -> Self {
        self.state().fail_on = Some(pattern.to_string());
        self
    }

    pub fn dropping_on(self, pattern: &str) -> Self {
        self.state().drop_on = Some(pattern.to_string());
        self
    }

    pub fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().expect("host state")
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.state().events.clone()
    }

    /// Commands run as `account`, in order.
    pub fn commands_as(&self, account: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Exec(a, cmd) if a == account => Some(cmd),
                _ => None,
            })
            .collect()
    }
}

impl SessionConnector for FakeHost {
    type Session = FakeSession;

    async fn open(&self, host: &TargetHost, account: &str) -> Result<FakeSession, SessionError> {
        let mut state = self.state();
        state.events.push(HostEvent::Open(account.to_string()));
        if !state.accounts.contains(account) {
            return Err(SessionError::AuthRejected {
                host: host.to_string(),
                account: account.to_string(),
                detail: format!("{account}@{host}: Permission denied (publickey)."),
            });
        }
        Ok(FakeSession {
            host: host.clone(),
            account: account.to_string(),
            state: Arc::clone(&self.state),
            closed: false,
        })
    }
}

pub struct FakeSession {
    host: TargetHost,
    account: String,
    state: Arc<Mutex<HostState>>,
    closed: bool,
}

fn ok(output: String) -> CommandResult {
    CommandResult {
        success: true,
        exit_code: Some(0),
        output,
    }
}

impl RemoteSession for FakeSession {
    fn host(&self) -> &TargetHost {
        &self.host
    }

    fn account(&self) -> &str {
        &self.account
    }

    async fn execute(&self, command: &str) -> Result<CommandResult, SessionError> {
        if self.closed {
            return Err(SessionError::Closed {
                host: self.host.to_string(),
                account: self.account.clone(),
            });
        }
        let mut state = self.state.lock().expect("host state");
        state
            .events
            .push(HostEvent::Exec(self.account.clone(), command.to_string()));

        if state.drop_on.as_deref().is_some_and(|p| command.contains(p)) {
            return Err(SessionError::Disconnected {
                host: self.host.to_string(),
                command: command.to_string(),
                detail: "Connection reset by peer".to_string(),
            });
        }
        if state.fail_on.as_deref().is_some_and(|p| command.contains(p)) {
            return Ok(CommandResult {
                success: false,
                exit_code: Some(1),
                output: "simulated failure\n".to_string(),
            });
        }
        if command.contains("useradd") {
            state.accounts.insert("sidekick".to_string());
        }
        if command.contains("age-keygen") {
            let key = if let Some(k) = state.age_key.clone() {
                k
            } else {
                state.keys_generated += 1;
                let k = format!("age1simulated{}", state.keys_generated);
                state.age_key = Some(k.clone());
                k
            };
            return Ok(ok(format!("# created: 2024-01-01\nPublic key: {key}\n")));
        }
        Ok(ok(String::new()))
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        if !self.closed {
            self.closed = true;
            self.state
                .lock()
                .expect("host state")
                .events
                .push(HostEvent::Close(self.account.clone()));
        }
        Ok(())
    }
}

/// Config store backed by memory; counts writes.
#[derive(Default)]
pub struct MemoryStore {
    pub saved: Mutex<Option<SidekickConfig>>,
    pub writes: Mutex<usize>,
    pub read_only: bool,
}

impl MemoryStore {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().expect("writes")
    }

    pub fn saved(&self) -> Option<SidekickConfig> {
        self.saved.lock().expect("saved").clone()
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<SidekickConfig> {
        Ok(self.saved().unwrap_or_default())
    }

    fn persist(&self, config: &SidekickConfig) -> Result<()> {
        anyhow::ensure!(!self.read_only, "read-only file system");
        *self.saved.lock().expect("saved") = Some(config.clone());
        *self.writes.lock().expect("writes") += 1;
        Ok(())
    }

    fn path(&self) -> PathBuf {
        PathBuf::from("/memory/default.yaml")
    }
}

/// Reporter that ignores everything.
pub struct Silent;

impl ProgressReporter for Silent {
    fn start(&self, _: &str) {}
    fn update(&self, _: &str, _: &str) {}
    fn success(&self, _: &str, _: &str) {}
    fn fail(&self, _: &str, _: &str) {}
}
