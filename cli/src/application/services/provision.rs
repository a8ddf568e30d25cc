//! Application service: the provisioning run.
//!
//! Drives one host from `Unauthenticated` to `Complete`:
//! bootstrap login, account creation, operational login, the three
//! configuration stages, then a single write of the local configuration.
//! Imports only from `crate::domain` and `crate::application`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::application::ports::{ConfigStore, ProgressReporter, RemoteSession, SessionConnector};
use crate::application::services::executor::{self, OutputMode};
use crate::application::services::inputs::ProvisionInputs;
use crate::application::services::stage_runner::run_stage;
use crate::domain::config::{KEY_CERT_EMAIL, KEY_PUBLIC_KEY, KEY_SERVER_ADDRESS};
use crate::domain::facts::extract_public_key;
use crate::domain::stage::{self, Stage, keygen_command};
use crate::domain::state::{BOOTSTRAP_ACCOUNT, OPERATIONAL_ACCOUNT};
use crate::domain::{
    FailureCause, PersistenceError, ProvisionError, ProvisionState, SessionError, SidekickConfig,
    StageError, StageFailure,
};

/// Entry into a state, with the time it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub state: ProvisionState,
    pub at: DateTime<Utc>,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionReport {
    pub server_address: String,
    pub cert_email: String,
    pub public_key: String,
    /// Where the configuration was written.
    pub config_path: String,
    pub transitions: Vec<Transition>,
}

/// Tracks reached states and mirrors phase lifecycle onto the reporter.
struct Run<'a, R: ProgressReporter> {
    reporter: &'a R,
    transitions: Vec<Transition>,
}

impl<'a, R: ProgressReporter> Run<'a, R> {
    fn new(reporter: &'a R) -> Self {
        Self {
            reporter,
            transitions: vec![Transition {
                state: ProvisionState::Unauthenticated,
                at: Utc::now(),
            }],
        }
    }

    fn begin(&self, target: ProvisionState) {
        info!(state = %target, "{}", target.description());
        self.reporter.start(target.description());
    }

    /// The only state this run may move into next.
    fn next_state(&self) -> Option<ProvisionState> {
        self.transitions.last().and_then(|t| t.state.next())
    }

    fn complete(&mut self, target: ProvisionState, message: &str) {
        debug_assert_eq!(
            self.next_state(),
            Some(target),
            "provisioning states must be reached in order"
        );
        self.reporter.success(target.description(), message);
        info!(state = %target, "state reached");
        self.transitions.push(Transition {
            state: target,
            at: Utc::now(),
        });
    }

    fn abort(&self, target: ProvisionState, message: &str, cause: FailureCause) -> ProvisionError {
        self.reporter.fail(target.description(), message);
        debug!(state = %target, code = cause.code(), error = %cause, "provisioning halted");
        ProvisionError {
            failed_at: target,
            cause,
            reached: self.transitions.iter().map(|t| t.state).collect(),
        }
    }

    async fn stage(
        &mut self,
        target: ProvisionState,
        stage: &Stage,
        session: &impl RemoteSession,
    ) -> Result<(), ProvisionError> {
        self.begin(target);
        match run_stage(stage, session, self.reporter).await {
            Ok(()) => {
                self.complete(target, stage.success_message());
                Ok(())
            }
            Err(e) => Err(self.abort(target, stage.failure_message(), FailureCause::Stage(e))),
        }
    }
}

fn session_cause(err: SessionError) -> FailureCause {
    if err.is_handshake() {
        FailureCause::Authentication(err)
    } else {
        FailureCause::Session(err)
    }
}

async fn close_quietly(session: &mut impl RemoteSession) {
    if let Err(e) = session.close().await {
        warn!(account = session.account(), error = %e, "failed to close session");
    }
}

/// Provision `inputs.host` and persist the resulting settings into `config`.
///
/// `config` is the profile's current configuration; unrelated keys in it are
/// written back untouched. The store is written exactly once, and only after
/// every remote stage has succeeded.
///
/// # Errors
///
/// Returns a `ProvisionError` naming the state that could not be reached.
/// Remote changes made before the failure are left in place.
pub async fn provision<C: SessionConnector>(
    connector: &C,
    store: &impl ConfigStore,
    reporter: &impl ProgressReporter,
    inputs: &ProvisionInputs,
    mut config: SidekickConfig,
) -> Result<ProvisionReport, ProvisionError> {
    let mut run = Run::new(reporter);

    // Bootstrap account: only used to create the operating account.
    let target = ProvisionState::BootstrapAuthenticated;
    run.begin(target);
    let mut bootstrap = match connector.open(&inputs.host, BOOTSTRAP_ACCOUNT).await {
        Ok(s) => s,
        Err(e) => return Err(run.abort(target, "Could not log in", session_cause(e))),
    };
    run.complete(target, &format!("Logged in with {BOOTSTRAP_ACCOUNT}"));

    let created = run
        .stage(ProvisionState::AccountCreated, &stage::user_setup_stage(), &bootstrap)
        .await;
    close_quietly(&mut bootstrap).await;
    created?;

    let target = ProvisionState::OperationalAuthenticated;
    run.begin(target);
    let mut session = match connector.open(&inputs.host, OPERATIONAL_ACCOUNT).await {
        Ok(s) => s,
        Err(e) => return Err(run.abort(target, "Could not log in", session_cause(e))),
    };
    run.complete(target, &format!("Logged in as {OPERATIONAL_ACCOUNT}"));

    let configured = configure_host(&mut run, &session, &inputs.cert_email).await;
    close_quietly(&mut session).await;
    let public_key = configured?;

    let target = ProvisionState::Complete;
    run.begin(target);
    let server_address = inputs.host.to_string();
    let path = store.path().display().to_string();
    let saved = [
        (KEY_SERVER_ADDRESS, &server_address),
        (KEY_CERT_EMAIL, &inputs.cert_email),
        (KEY_PUBLIC_KEY, &public_key),
    ]
    .into_iter()
    .try_for_each(|(key, value)| config.set(key, value.as_str()))
    .map_err(anyhow::Error::from)
    .and_then(|()| store.persist(&config));
    if let Err(e) = saved {
        let cause = FailureCause::Persistence(PersistenceError {
            path,
            detail: format!("{e:#}"),
            server_address,
            cert_email: inputs.cert_email.clone(),
            public_key,
        });
        return Err(run.abort(target, "Could not save configuration", cause));
    }
    run.complete(target, &format!("Saved configuration to {path}"));

    Ok(ProvisionReport {
        server_address,
        cert_email: inputs.cert_email.clone(),
        public_key,
        config_path: path,
        transitions: run.transitions,
    })
}

/// Base, runtime and proxy stages over the operational session.
/// Returns the host's public encryption key.
async fn configure_host<R: ProgressReporter>(
    run: &mut Run<'_, R>,
    session: &impl RemoteSession,
    cert_email: &str,
) -> Result<String, ProvisionError> {
    let target = ProvisionState::BaseConfigured;
    let base = stage::base_setup_stage();
    run.begin(target);
    if let Err(e) = run_stage(&base, session, run.reporter).await {
        return Err(run.abort(target, base.failure_message(), FailureCause::Stage(e)));
    }

    run.reporter.update(target.description(), "generating encryption key");
    let public_key = match read_public_key(&base, session).await {
        Ok(key) => key,
        Err(cause) => return Err(run.abort(target, base.failure_message(), cause)),
    };
    info!(public_key = %public_key, "public key extracted");
    run.complete(target, base.success_message());

    run.stage(ProvisionState::RuntimeConfigured, &stage::docker_stage(), session)
        .await?;
    run.stage(
        ProvisionState::ProxyConfigured,
        &stage::traefik_stage(cert_email),
        session,
    )
    .await?;

    Ok(public_key)
}

/// Runs the keygen command as the trailing step of `base`.
async fn read_public_key(base: &Stage, session: &impl RemoteSession) -> Result<String, FailureCause> {
    let command = keygen_command();
    let index = base.commands().len();
    let result = executor::execute(session, &command, OutputMode::Capture)
        .await
        .map_err(|source| {
            FailureCause::Stage(StageError::Transport {
                stage: base.name().to_string(),
                index,
                source,
            })
        })?;
    if !result.success {
        return Err(FailureCause::Stage(StageError::CommandFailed(StageFailure {
            stage: base.name().to_string(),
            index,
            total: index + 1,
            command,
            output: result.output,
        })));
    }
    extract_public_key(&result.output).map_err(FailureCause::Extraction)
}
