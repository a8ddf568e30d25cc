//! Target host identity and operator input validation.
//!
//! Pure functions only.

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::domain::error::InputError;

/// The machine being provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHost {
    address: Ipv4Addr,
}

impl TargetHost {
    /// Wrap an already-validated address.
    #[must_use]
    pub fn new(address: Ipv4Addr) -> Self {
        Self { address }
    }

    /// The host's IPv4 address.
    #[must_use]
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// `account@address`, the form ssh expects as its destination.
    #[must_use]
    pub fn destination(&self, account: &str) -> String {
        format!("{account}@{}", self.address)
    }
}

impl std::fmt::Display for TargetHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// Validates the server address as a dotted-quad IPv4 address.
///
/// Hostnames (including `localhost`) are rejected.
///
/// # Errors
///
/// Returns `InputError::InvalidAddress` if `raw` is not an IPv4 address.
pub fn validate_server_address(raw: &str) -> Result<TargetHost, InputError> {
    let trimmed = raw.trim();
    Ipv4Addr::from_str(trimmed)
        .map(TargetHost::new)
        .map_err(|_| InputError::InvalidAddress(raw.to_string()))
}

/// Validates the certificate contact email.
///
/// The value lands inside a double-quoted YAML scalar in the proxy config,
/// so only printable ASCII is accepted and quote characters and `\` are
/// refused.
///
/// # Errors
///
/// Returns `InputError::MissingEmail` when empty, `InputError::InvalidEmail`
/// when it contains forbidden characters.
pub fn validate_cert_email(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingEmail);
    }
    if !trimmed.chars().all(is_email_char) {
        return Err(InputError::InvalidEmail(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

fn is_email_char(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '"' | '\'' | '`' | '\\')
}
