//! Diagnostic logging.
//!
//! Events go to stderr only; stdout carries user-facing output and `--json`
//! documents. The filter comes from `SIDEKICK_LOG`, then `RUST_LOG`, then the
//! default level (`warn`, or `debug` for this crate with `--verbose`).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "SIDEKICK_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "warn,sidekick_cli=debug" } else { "warn" }
}

/// Build the filter from the environment, falling back to the default level.
#[must_use]
pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbose: bool, no_color: bool) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color && console::Term::stderr().is_term())
        .with_target(verbose);

    let _ = tracing_subscriber::registry()
        .with(filter(verbose))
        .with(layer)
        .try_init();
}
