//! JSON output helpers.
//!
//! `--json` prints exactly one object on stdout: the run report on success,
//! or an error object when the command fails.

use anyhow::{Context, Result};

use crate::application::services::provision::ProvisionReport;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Format a successful provisioning report.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_report(report: &ProvisionReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("JSON serialization failed")
}
