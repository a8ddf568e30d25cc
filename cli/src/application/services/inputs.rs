//! Application service: resolve and validate operator inputs.
//!
//! Precedence per value: explicit flag, then the profile's saved value, then
//! the input collector (an interactive prompt in production).

use crate::application::ports::InputCollector;
use crate::domain::config::{KEY_CERT_EMAIL, KEY_SERVER_ADDRESS};
use crate::domain::{InputError, SidekickConfig, TargetHost, validate_cert_email, validate_server_address};

pub const SERVER_PROMPT: &str = "Please enter the IPv4 Address of your VPS";
pub const EMAIL_PROMPT: &str = "Please enter an email for use with TLS certs";

/// Values supplied on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputOverrides<'a> {
    pub server: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Validated inputs for a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionInputs {
    pub host: TargetHost,
    pub cert_email: String,
}

/// Resolve the target host and certificate email.
///
/// # Errors
///
/// Returns an `InputError` if a value is missing, the collector fails, or
/// validation rejects a value. The run must not start in that case.
pub fn resolve_inputs(
    collector: &impl InputCollector,
    config: &SidekickConfig,
    overrides: InputOverrides<'_>,
) -> Result<ProvisionInputs, InputError> {
    let server = collect(
        collector,
        SERVER_PROMPT,
        preset(overrides.server, config.get(KEY_SERVER_ADDRESS).ok().flatten()),
    )?;
    let host = validate_server_address(&server)?;

    let email = collect(
        collector,
        EMAIL_PROMPT,
        preset(overrides.email, config.get(KEY_CERT_EMAIL).ok().flatten()),
    )
    .map_err(|e| match e {
        InputError::NoValue(_) => InputError::MissingEmail,
        other => other,
    })?;
    let cert_email = validate_cert_email(&email)?;

    Ok(ProvisionInputs { host, cert_email })
}

fn preset<'a>(flag: Option<&'a str>, saved: Option<&'a str>) -> Option<&'a str> {
    flag.filter(|v| !v.trim().is_empty())
        .or_else(|| saved.filter(|v| !v.trim().is_empty()))
}

fn collect(
    collector: &impl InputCollector,
    label: &str,
    preset: Option<&str>,
) -> Result<String, InputError> {
    collector
        .collect(label, preset)
        .map_err(|e| InputError::Prompt {
            label: label.to_string(),
            detail: format!("{e:#}"),
        })?
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| InputError::NoValue(label.to_string()))
}
