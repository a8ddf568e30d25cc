//! Provisioning run states.
//!
//! A run moves strictly forward through these states; the only way out of
//! the sequence is a `ProvisionError` carrying the state that was not reached.

use serde::Serialize;

/// Privileged account used only to create the operating account.
pub const BOOTSTRAP_ACCOUNT: &str = "root";

/// Restricted account used for every configuration stage.
pub const OPERATIONAL_ACCOUNT: &str = "sidekick";

/// Milestones of a single provisioning run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionState {
    Unauthenticated,
    BootstrapAuthenticated,
    AccountCreated,
    OperationalAuthenticated,
    BaseConfigured,
    RuntimeConfigured,
    ProxyConfigured,
    Complete,
}

impl ProvisionState {
    /// All states in run order.
    pub const ALL: [Self; 8] = [
        Self::Unauthenticated,
        Self::BootstrapAuthenticated,
        Self::AccountCreated,
        Self::OperationalAuthenticated,
        Self::BaseConfigured,
        Self::RuntimeConfigured,
        Self::ProxyConfigured,
        Self::Complete,
    ];

    /// The state that follows this one, `None` for `Complete`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let pos = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(pos + 1).copied()
    }

    /// Human-readable description of the work that leads into this state.
    ///
    /// Doubles as the progress label for that phase.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Starting",
            Self::BootstrapAuthenticated => "Logging in with root",
            Self::AccountCreated => "Adding user sidekick",
            Self::OperationalAuthenticated => "Logging in as sidekick",
            Self::BaseConfigured => "Setting up VPS",
            Self::RuntimeConfigured => "Setting up Docker",
            Self::ProxyConfigured => "Setting up Traefik",
            Self::Complete => "Saving configuration",
        }
    }

    /// Progress labels for every phase that does remote or local work.
    #[must_use]
    pub fn phase_labels() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .skip(1)
            .map(|s| s.description())
            .collect()
    }
}

impl std::fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unauthenticated => "Unauthenticated",
            Self::BootstrapAuthenticated => "BootstrapAuthenticated",
            Self::AccountCreated => "AccountCreated",
            Self::OperationalAuthenticated => "OperationalAuthenticated",
            Self::BaseConfigured => "BaseConfigured",
            Self::RuntimeConfigured => "RuntimeConfigured",
            Self::ProxyConfigured => "ProxyConfigured",
            Self::Complete => "Complete",
        };
        f.write_str(name)
    }
}
