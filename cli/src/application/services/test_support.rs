//! Shared test doubles for session-driven services.
//!
//! `ScriptedSession` answers commands from a script matched by substring and
//! records every open/exec/close into an event log shared with its
//! `ScriptedConnector`, so tests can assert on exact ordering.

#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use crate::application::ports::{
    CommandResult, ProgressReporter, RemoteSession, SessionConnector,
};
use crate::domain::{SessionError, TargetHost};

/// Something that happened against a fake host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(String),
    Exec(String, String),
    Close(String),
}

#[derive(Debug, Clone)]
enum Reply {
    Ok(String),
    Fail(String),
    Drop,
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn test_host() -> TargetHost {
    TargetHost::new(Ipv4Addr::new(192, 0, 2, 10))
}

/// A session that replays scripted replies. Unscripted commands succeed silently.
#[derive(Debug, Clone)]
pub struct ScriptedSession {
    host: TargetHost,
    account: String,
    script: Vec<(String, Reply)>,
    log: EventLog,
    closed: bool,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            host: test_host(),
            account: "sidekick".to_string(),
            script: Vec::new(),
            log: Arc::new(Mutex::new(Vec::new())),
            closed: false,
        }
    }

    pub fn ok(mut self, pattern: &str, output: &str) -> Self {
        self.script.push((pattern.to_string(), Reply::Ok(output.to_string())));
        self
    }

    pub fn fail(mut self, pattern: &str, output: &str) -> Self {
        self.script.push((pattern.to_string(), Reply::Fail(output.to_string())));
        self
    }

    pub fn drop_connection(mut self, pattern: &str) -> Self {
        self.script.push((pattern.to_string(), Reply::Drop));
        self
    }

    /// Commands executed on this session, in order.
    pub fn executed(&self) -> Vec<String> {
        self.log
            .lock()
            .expect("log mutex")
            .iter()
            .filter_map(|e| match e {
                Event::Exec(_, cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    fn with_identity(&self, account: &str, log: EventLog) -> Self {
        Self {
            host: self.host.clone(),
            account: account.to_string(),
            script: self.script.clone(),
            log,
            closed: false,
        }
    }
}

impl RemoteSession for ScriptedSession {
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
        self.log
            .lock()
            .expect("log mutex")
            .push(Event::Exec(self.account.clone(), command.to_string()));
        let reply = self
            .script
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map_or(Reply::Ok(String::new()), |(_, r)| r.clone());
        match reply {
            Reply::Ok(output) => Ok(CommandResult {
                success: true,
                exit_code: Some(0),
                output,
            }),
            Reply::Fail(output) => Ok(CommandResult {
                success: false,
                exit_code: Some(1),
                output,
            }),
            Reply::Drop => Err(SessionError::Disconnected {
                host: self.host.to_string(),
                command: command.to_string(),
                detail: "Broken pipe".to_string(),
            }),
        }
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        if !self.closed {
            self.closed = true;
            self.log
                .lock()
                .expect("log mutex")
                .push(Event::Close(self.account.clone()));
        }
        Ok(())
    }
}

/// Hands out `ScriptedSession`s per account, or a canned handshake error.
pub struct ScriptedConnector {
    sessions: HashMap<String, Result<ScriptedSession, SessionError>>,
    pub log: EventLog,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn account(mut self, account: &str, script: ScriptedSession) -> Self {
        self.sessions.insert(account.to_string(), Ok(script));
        self
    }

    pub fn reject(mut self, account: &str) -> Self {
        self.sessions.insert(
            account.to_string(),
            Err(SessionError::AuthRejected {
                host: test_host().to_string(),
                account: account.to_string(),
                detail: "Permission denied (publickey)".to_string(),
            }),
        );
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.lock().expect("log mutex").clone()
    }
}

impl SessionConnector for ScriptedConnector {
    type Session = ScriptedSession;

    async fn open(&self, host: &TargetHost, account: &str) -> Result<ScriptedSession, SessionError> {
        self.log
            .lock()
            .expect("log mutex")
            .push(Event::Open(account.to_string()));
        match self.sessions.get(account) {
            Some(Ok(script)) => Ok(script.with_identity(account, Arc::clone(&self.log))),
            Some(Err(e)) => Err(e.clone()),
            None => Err(SessionError::Unreachable {
                host: host.to_string(),
                account: account.to_string(),
                detail: "no script for account".to_string(),
            }),
        }
    }
}

/// Records every progress call as a string.
#[derive(Default)]
pub struct RecordingReporter {
    pub calls: Mutex<Vec<String>>,
}

impl ProgressReporter for RecordingReporter {
    fn start(&self, label: &str) {
        self.calls.lock().expect("mutex").push(format!("start:{label}"));
    }
    fn update(&self, label: &str, message: &str) {
        self.calls
            .lock()
            .expect("mutex")
            .push(format!("update:{label}:{message}"));
    }
    fn success(&self, label: &str, message: &str) {
        self.calls
            .lock()
            .expect("mutex")
            .push(format!("success:{label}:{message}"));
    }
    fn fail(&self, label: &str, message: &str) {
        self.calls
            .lock()
            .expect("mutex")
            .push(format!("fail:{label}:{message}"));
    }
}
