//! Facts parsed out of captured remote command output.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::ExtractionError;
use crate::domain::stage::PUBLIC_KEY_MARKER;

#[allow(clippy::expect_used)] // Pattern is a compile-time constant
static PUBLIC_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{}[ \t]*(\S+)", regex::escape(PUBLIC_KEY_MARKER)))
        .expect("valid public key pattern")
});

/// Extracts the public key from `age-keygen` output.
///
/// The key is the token that follows `Public key:` on the same line. Any
/// surrounding text (warnings, trailing words) is ignored.
///
/// # Errors
///
/// Returns `ExtractionError::MarkerNotFound` if the marker is absent and
/// `ExtractionError::MissingValue` if nothing follows it on its line.
pub fn extract_public_key(output: &str) -> Result<String, ExtractionError> {
    if !output.contains(PUBLIC_KEY_MARKER) {
        return Err(ExtractionError::MarkerNotFound {
            marker: PUBLIC_KEY_MARKER.to_string(),
        });
    }
    PUBLIC_KEY_RE
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractionError::MissingValue {
            marker: PUBLIC_KEY_MARKER.to_string(),
        })
}
