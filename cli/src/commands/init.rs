//! Init command: provision a VPS and save its settings to the profile.

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::app::{AppContext, Interrupted};
use crate::application::ports::ConfigStore;
use crate::application::services::inputs::{InputOverrides, resolve_inputs};
use crate::application::services::provision::{ProvisionReport, provision};
use crate::domain::{FailureCause, ProvisionError, ProvisionState, StageError};
use crate::infra::config::{DEFAULT_PROFILE, YamlConfigStore};
use crate::infra::prompt::DialoguerCollector;
use crate::infra::ssh::SshOptions;
use crate::output::{OutputContext, SpinnerBoard, TerminalReporter, json};

/// Lines of failing command output shown to the operator.
const OUTPUT_TAIL: usize = 20;

/// Arguments for the `sidekick init` command.
#[derive(Args)]
pub struct InitArgs {
    /// IPv4 address of your VPS
    #[arg(short, long, value_name = "IP")]
    pub server: Option<String>,

    /// Email address used for TLS certificates
    #[arg(short, long)]
    pub email: Option<String>,

    /// Configuration profile to read and update
    #[arg(long, value_name = "NAME", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Kill any remote command that runs longer than this
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub command_timeout: Option<u64>,

    /// Give up on an SSH handshake after this long
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout: u64,
}

impl InitArgs {
    fn ssh_options(&self) -> SshOptions {
        SshOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout),
            command_timeout: self.command_timeout.map(Duration::from_secs),
        }
    }
}

/// Entry point for `sidekick init`.
///
/// # Errors
///
/// Returns an error if the profile cannot be loaded, inputs are missing or
/// invalid, provisioning halts, or the operator interrupts the run.
pub async fn run(app: &AppContext, args: InitArgs) -> Result<()> {
    let store = YamlConfigStore::for_profile(&args.profile)?;
    let config = store.load()?;

    app.output.banner(
        "Welcome to Sidekick",
        "We need to collect some details from you first",
    );

    let collector = DialoguerCollector::new(app.non_interactive);
    let inputs = resolve_inputs(
        &collector,
        &config,
        InputOverrides {
            server: args.server.as_deref(),
            email: args.email.as_deref(),
        },
    )?;

    app.output.header("Sidekick booting up!");
    app.output.kv("server", &inputs.host.to_string());
    app.output.kv("profile", &args.profile);

    let connector = app.ssh_connector(args.ssh_options());
    let work = async {
        if app.output.show_progress() {
            let board = SpinnerBoard::new().with_phases(&ProvisionState::phase_labels());
            let outcome = provision(&connector, &store, &board, &inputs, config).await;
            board.clear_waiting();
            outcome
        } else {
            let reporter = TerminalReporter::new(&app.output);
            provision(&connector, &store, &reporter, &inputs, config).await
        }
    };

    // Dropping `work` kills the in-flight ssh child and closes open masters.
    let outcome = tokio::select! {
        outcome = work => outcome,
        _ = tokio::signal::ctrl_c() => {
            app.output.error("Interrupted; the host may be partially configured");
            return Err(Interrupted.into());
        }
    };

    match outcome {
        Ok(report) => {
            if app.is_json() {
                println!("{}", json::format_report(&report)?);
            } else {
                print_ready(&app.output, &report);
            }
            Ok(())
        }
        Err(err) => {
            print_failure(&app.output, &err);
            Err(err.into())
        }
    }
}

fn print_ready(ctx: &OutputContext, report: &ProvisionReport) {
    println!();
    ctx.kv("public key", &report.public_key);
    ctx.kv("config", &report.config_path);
    ctx.info("Your VPS is ready! You can now run `sidekick launch` in your app folder");
    println!();
}

/// Show what the operator needs to act on a failed run.
fn print_failure(ctx: &OutputContext, err: &ProvisionError) {
    if ctx.quiet {
        return;
    }
    if let Some(last) = err.reached.last() {
        ctx.kv("last completed", last.description());
    }
    if let FailureCause::Stage(StageError::CommandFailed(failure)) = &err.cause {
        ctx.kv("command", &failure.command);
        for line in tail(&failure.output, OUTPUT_TAIL) {
            eprintln!("    {line}");
        }
    }
    if err.failed_at > ProvisionState::AccountCreated {
        ctx.warn("Remote changes made so far are kept; re-running `sidekick init` is safe");
    }
}

fn tail(text: &str, n: usize) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].to_vec()
}
