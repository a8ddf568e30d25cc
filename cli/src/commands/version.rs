//! Version command

use anyhow::Result;

use crate::app::AppContext;

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");

    if app.is_json() {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "version": version }))?);
    } else {
        println!("sidekick {version}");
    }
    Ok(())
}
