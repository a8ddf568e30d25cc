//! Infrastructure implementation of the `InputCollector` port.

use anyhow::{Context, Result};

use crate::application::ports::InputCollector;

/// Prompts on the terminal with `dialoguer`.
///
/// When `non_interactive` is set (`--yes`, `CI`, `SIDEKICK_YES`), only
/// presets are returned and nothing is ever asked.
#[derive(Debug, Clone, Copy)]
pub struct DialoguerCollector {
    non_interactive: bool,
}

impl DialoguerCollector {
    #[must_use]
    pub fn new(non_interactive: bool) -> Self {
        Self { non_interactive }
    }
}

impl InputCollector for DialoguerCollector {
    fn collect(&self, label: &str, preset: Option<&str>) -> Result<Option<String>> {
        if let Some(value) = preset.map(str::trim).filter(|v| !v.is_empty()) {
            return Ok(Some(value.to_string()));
        }
        if self.non_interactive {
            return Ok(None);
        }
        let answer: String = dialoguer::Input::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
            .with_context(|| format!("prompt for '{label}' failed"))?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}
