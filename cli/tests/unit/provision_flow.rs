//! End-to-end provisioning runs against a simulated host.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::Ipv4Addr;

use sidekick_cli::application::{ConfigStore, RemoteSession};
use sidekick_cli::application::ports::SessionConnector;
use sidekick_cli::application::services::inputs::ProvisionInputs;
use sidekick_cli::application::services::provision::provision;
use sidekick_cli::domain::stage::{
    base_setup_stage, docker_stage, keygen_command, traefik_stage, user_setup_stage,
};
use sidekick_cli::domain::{
    FailureCause, ProvisionState, SessionError, SidekickConfig, StageError, TargetHost,
};

use crate::mocks::{FakeHost, HostEvent, MemoryStore, Silent};

const EMAIL: &str = "ops@example.com";

fn inputs() -> ProvisionInputs {
    ProvisionInputs {
        host: TargetHost::new(Ipv4Addr::new(198, 51, 100, 23)),
        cert_email: EMAIL.to_string(),
    }
}

#[tokio::test]
async fn fresh_host_is_fully_provisioned() {
    let host = FakeHost::fresh();
    let store = MemoryStore::default();

    let report = provision(&host, &store, &Silent, &inputs(), SidekickConfig::default())
        .await
        .expect("provisioning should succeed");

    assert_eq!(report.public_key, "age1simulated1");
    assert_eq!(report.config_path, "/memory/default.yaml");
    assert_eq!(
        report.transitions.last().map(|t| t.state),
        Some(ProvisionState::Complete)
    );

    let saved = store.saved().expect("config written");
    assert_eq!(saved.server_address, "198.51.100.23");
    assert_eq!(saved.cert_email, EMAIL);
    assert_eq!(saved.public_key, "age1simulated1");
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn stage_commands_run_in_declared_order_per_account() {
    let host = FakeHost::fresh();
    provision(&host, &MemoryStore::default(), &Silent, &inputs(), SidekickConfig::default())
        .await
        .unwrap();

    assert_eq!(host.commands_as("root"), user_setup_stage().commands().to_vec());

    let mut expected: Vec<String> = base_setup_stage().commands().to_vec();
    expected.push(keygen_command());
    expected.extend(docker_stage().commands().iter().cloned());
    expected.extend(traefik_stage(EMAIL).commands().iter().cloned());
    assert_eq!(host.commands_as("sidekick"), expected);
}

#[tokio::test]
async fn bootstrap_session_is_released_before_operational_login() {
    let host = FakeHost::fresh();
    provision(&host, &MemoryStore::default(), &Silent, &inputs(), SidekickConfig::default())
        .await
        .unwrap();

    let events = host.events();
    let opens: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, HostEvent::Open(_) | HostEvent::Close(_)))
        .cloned()
        .collect();
    assert_eq!(
        opens,
        vec![
            HostEvent::Open("root".into()),
            HostEvent::Close("root".into()),
            HostEvent::Open("sidekick".into()),
            HostEvent::Close("sidekick".into()),
        ]
    );
}

#[tokio::test]
async fn operating_account_cannot_log_in_before_it_exists() {
    let host = FakeHost::fresh();
    let err = host
        .open(&inputs().host, "sidekick")
        .await
        .err()
        .expect("login should be rejected");
    assert!(matches!(err, SessionError::AuthRejected { .. }));
}

#[tokio::test]
async fn failed_account_creation_never_logs_in_as_operator() {
    let host = FakeHost::fresh().failing_on("useradd");
    let store = MemoryStore::default();

    let err = provision(&host, &store, &Silent, &inputs(), SidekickConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.failed_at, ProvisionState::AccountCreated);
    assert!(!host.events().contains(&HostEvent::Open("sidekick".into())));
    assert_eq!(host.commands_as("root").len(), 1);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn proxy_failure_keeps_earlier_stages_and_skips_persistence() {
    let host = FakeHost::fresh().failing_on("docker compose up");
    let store = MemoryStore::default();

    let err = provision(&host, &store, &Silent, &inputs(), SidekickConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.failed_at, ProvisionState::ProxyConfigured);
    assert_eq!(err.reached.last(), Some(&ProvisionState::RuntimeConfigured));
    let FailureCause::Stage(StageError::CommandFailed(failure)) = &err.cause else {
        panic!("expected stage failure, got {:?}", err.cause);
    };
    assert_eq!(failure.index, traefik_stage(EMAIL).commands().len() - 1);
    assert_eq!(store.writes(), 0);
    assert!(host.state().age_key.is_some(), "earlier remote work is not rolled back");
}

#[tokio::test]
async fn dropped_connection_is_fatal_and_not_retried() {
    let host = FakeHost::fresh().dropping_on("apt-get upgrade");
    let err = provision(&host, &MemoryStore::default(), &Silent, &inputs(), SidekickConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.failed_at, ProvisionState::BaseConfigured);
    assert!(matches!(
        err.cause,
        FailureCause::Stage(StageError::Transport { index: 1, .. })
    ));
    let upgrades = host
        .commands_as("sidekick")
        .iter()
        .filter(|c| c.contains("apt-get upgrade"))
        .count();
    assert_eq!(upgrades, 1);
}

#[tokio::test]
async fn rerun_on_provisioned_host_reuses_the_key() {
    let host = FakeHost::fresh();
    let store = MemoryStore::default();

    let first = provision(&host, &store, &Silent, &inputs(), SidekickConfig::default())
        .await
        .unwrap();
    let second = provision(&host, &store, &Silent, &inputs(), store.load().unwrap())
        .await
        .unwrap();

    assert_eq!(first.public_key, second.public_key);
    assert_eq!(host.state().keys_generated, 1);
    assert_eq!(store.writes(), 2);
}

#[tokio::test]
async fn read_only_config_reports_values_to_save_by_hand() {
    let host = FakeHost::fresh();
    let err = provision(&host, &MemoryStore::read_only(), &Silent, &inputs(), SidekickConfig::default())
        .await
        .unwrap_err();

    assert_eq!(err.failed_at, ProvisionState::Complete);
    let msg = err.to_string();
    assert!(msg.contains("age1simulated1"), "got: {msg}");
    assert!(msg.contains("198.51.100.23"), "got: {msg}");
    assert_eq!(err.cause.code(), "persistence_error");
}

#[tokio::test]
async fn session_reports_its_identity() {
    let host = FakeHost::fresh();
    let session = host.open(&inputs().host, "root").await.unwrap();
    assert_eq!(session.account(), "root");
    assert_eq!(session.host().to_string(), "198.51.100.23");
}
