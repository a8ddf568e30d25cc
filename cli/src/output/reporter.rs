//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly. Line-based; used when stdout is not a TTY.

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `start()` prints `"  → {label}"` (suppressed when `ctx.quiet`)
/// - `update()` prints nothing
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `fail()` prints `"  ✗ {message}"` to stderr (never suppressed)
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn start(&self, label: &str) {
        self.ctx.step(label);
    }

    fn update(&self, _label: &str, _message: &str) {}

    fn success(&self, _label: &str, message: &str) {
        self.ctx.success(message);
    }

    fn fail(&self, _label: &str, message: &str) {
        self.ctx.error(message);
    }
}
