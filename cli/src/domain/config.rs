//! Domain types and validators for Sidekick configuration.
//!
//! Pure functions only, no I/O.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const KEY_SERVER_ADDRESS: &str = "serverAddress";
pub const KEY_CERT_EMAIL: &str = "certEmail";
pub const KEY_PUBLIC_KEY: &str = "publicKey";

pub const VALID_CONFIG_KEYS: &[&str] = &[KEY_SERVER_ADDRESS, KEY_CERT_EMAIL, KEY_PUBLIC_KEY];

// ── Config schema ────────────────────────────────────────────────────────────

/// Settings stored in `~/.config/sidekick/<profile>.yaml`.
///
/// Keys written by other sidekick commands are kept in `extra` so a rewrite
/// never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SidekickConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub server_address: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cert_email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub public_key: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl SidekickConfig {
    /// Value for `key`, or `None` when unset or empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownKey` for keys outside `VALID_CONFIG_KEYS`.
    pub fn get(&self, key: &str) -> Result<Option<&str>, ConfigError> {
        let value = match key {
            KEY_SERVER_ADDRESS => &self.server_address,
            KEY_CERT_EMAIL => &self.cert_email,
            KEY_PUBLIC_KEY => &self.public_key,
            _ => return Err(unknown_key(key)),
        };
        Ok(Some(value.as_str()).filter(|v| !v.is_empty()))
    }

    /// Set `key` to `value`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownKey` for keys outside `VALID_CONFIG_KEYS`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), ConfigError> {
        let slot = match key {
            KEY_SERVER_ADDRESS => &mut self.server_address,
            KEY_CERT_EMAIL => &mut self.cert_email,
            KEY_PUBLIC_KEY => &mut self.public_key,
            _ => return Err(unknown_key(key)),
        };
        *slot = value.into();
        Ok(())
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::UnknownKey {
        key: key.to_string(),
        valid: VALID_CONFIG_KEYS.join(", "),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
