//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod facts;
pub mod host;
pub mod stage;
pub mod state;

pub use config::SidekickConfig;
pub use error::{
    ConfigError, ExtractionError, FailureCause, InputError, PersistenceError, ProvisionError,
    SessionError, StageError, StageFailure, TimeoutError,
};
pub use host::{TargetHost, validate_cert_email, validate_server_address};
pub use stage::Stage;
pub use state::ProvisionState;
