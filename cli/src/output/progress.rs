//! Progress indicators using indicatif

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::application::ports::ProgressReporter;

/// Create a spinner for indeterminate progress.
///
/// # Panics
///
/// Panics if the spinner template string is invalid (it is a compile-time constant and will not panic).
#[must_use]
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠁", "⠂", "⠄", "⡀", "⡈", "⡐", "⡠", "⣀", "⣁", "⣂", "⣄", "⣌", "⣔", "⣤", "⣥", "⣦",
                "⣮", "⣶", "⣷", "⣿", "⡿", "⠿", "⢟", "⠟", "⡛", "⠛", "⠫", "⢋", "⠋", "⠍", "⡉", "⠉",
                "⠑", "⠡", "⢁",
            ])
            .template("  {spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// A dimmed placeholder line for a phase that has not started.
#[must_use]
pub fn pending(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {prefix:.dim} {msg:.dim}")
            .expect("valid template"),
    );
    pb.set_prefix("·");
    pb.set_message(msg.to_string());
    pb
}

/// Turn a placeholder into a running spinner.
fn activate(pb: &ProgressBar) {
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"])
            .template("  {spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
}

/// Finish a spinner with a checkmark on the left.
pub fn finish_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {prefix:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_prefix("✓");
    pb.finish_with_message(msg.to_string());
}

/// Finish a spinner with a cross on the left.
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {prefix:.red} {msg}")
            .expect("valid template"),
    );
    pb.set_prefix("✗");
    pb.finish_with_message(msg.to_string());
}

/// One line per phase, stacked with `MultiProgress`.
///
/// Used when stdout is a terminal; `TerminalReporter` covers the rest.
/// Phases listed with `with_phases` show up as placeholders right away and
/// turn into spinners when they start.
pub struct SpinnerBoard {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
    waiting: Mutex<HashMap<String, ProgressBar>>,
}

impl SpinnerBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stdout())
    }

    /// A board that draws nowhere.
    #[must_use]
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        Self {
            multi: MultiProgress::with_draw_target(target),
            bars: Mutex::new(HashMap::new()),
            waiting: Mutex::new(HashMap::new()),
        }
    }

    /// Add a placeholder line for each label, in order.
    #[must_use]
    pub fn with_phases(self, labels: &[&str]) -> Self {
        {
            let mut waiting = self.waiting.lock().unwrap_or_else(PoisonError::into_inner);
            for label in labels {
                waiting.insert((*label).to_string(), self.multi.add(pending(label)));
            }
        }
        self
    }

    /// Number of phases listed but not started yet.
    #[must_use]
    pub fn waiting(&self) -> usize {
        self.waiting.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Drop placeholders of phases that never ran.
    pub fn clear_waiting(&self) {
        for (_, pb) in self
            .waiting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
        {
            pb.finish_and_clear();
        }
    }

    fn take(&self, label: &str) -> Option<ProgressBar> {
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(label)
    }

    /// Number of phases still spinning.
    #[must_use]
    pub fn active(&self) -> usize {
        self.bars.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for SpinnerBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for SpinnerBoard {
    fn start(&self, label: &str) {
        let placeholder = self
            .waiting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(label);
        let pb = match placeholder {
            Some(pb) => {
                activate(&pb);
                pb
            }
            None => self.multi.add(spinner(label)),
        };
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(label.to_string(), pb);
    }

    fn update(&self, label: &str, message: &str) {
        if let Some(pb) = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(label)
        {
            pb.set_message(format!("{label} ({message})"));
        }
    }

    fn success(&self, label: &str, message: &str) {
        if let Some(pb) = self.take(label) {
            finish_ok(&pb, message);
        }
    }

    fn fail(&self, label: &str, message: &str) {
        if let Some(pb) = self.take(label) {
            finish_error(&pb, message);
        }
    }
}
