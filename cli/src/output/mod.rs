//! Terminal output for the provisioning CLI.
//!
//! Lines are rendered to a `String` first and printed second, so the exact
//! text can be checked without a terminal.

pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
pub use progress::SpinnerBoard;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Column where `kv` values start, after the two-space indent.
const KEY_WIDTH: usize = 16;

/// Leading marker of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Step,
    Done,
    Warn,
    Fail,
    Note,
}

impl Mark {
    fn glyph(self) -> &'static str {
        match self {
            Self::Step => "→",
            Self::Done => "✓",
            Self::Warn => "⚠",
            Self::Fail => "✗",
            Self::Note => "ℹ",
        }
    }

    fn style(self, styles: &Styles) -> owo_colors::Style {
        match self {
            Self::Step | Self::Note => styles.step,
            Self::Done => styles.done,
            Self::Warn => styles.warn,
            Self::Fail => styles.fail,
        }
    }
}

/// Styling and terminal state shared by every command.
pub struct OutputContext {
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Suppresses everything except errors.
    pub quiet: bool,
}

impl OutputContext {
    /// Colors are used only on a TTY and when neither `--no-color` nor
    /// `NO_COLOR` is set.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var_os("NO_COLOR").is_none();
        Self {
            styles: if use_colors {
                Styles::colored()
            } else {
                Styles::default()
            },
            is_tty,
            quiet,
        }
    }

    /// Spinners need a terminal and are hidden by `--quiet`.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    #[must_use]
    pub fn mark_line(&self, mark: Mark, msg: &str) -> String {
        format!("  {} {msg}", mark.glyph().style(mark.style(&self.styles)))
    }

    /// `key` padded so values line up; long keys keep a two-space gap.
    #[must_use]
    pub fn kv_line(&self, key: &str, value: &str) -> String {
        let pad = KEY_WIDTH.saturating_sub(key.chars().count()).max(2);
        format!(
            "  {}{}{value}",
            key.style(self.styles.muted),
            " ".repeat(pad)
        )
    }

    /// Framed two-line banner; every line has the same visible width.
    #[must_use]
    pub fn banner_lines(&self, title: &str, subtitle: &str) -> Vec<String> {
        let inner = title.chars().count().max(subtitle.chars().count());
        let rule = "─".repeat(inner + 4);
        let bar = "│".style(self.styles.muted);
        let row = |text: String, len: usize| {
            format!("  {bar}  {text}{}  {bar}", " ".repeat(inner - len))
        };
        vec![
            format!("  {}", format!("╭{rule}╮").style(self.styles.muted)),
            row(
                title.style(self.styles.heading).to_string(),
                title.chars().count(),
            ),
            row(
                subtitle.style(self.styles.muted).to_string(),
                subtitle.chars().count(),
            ),
            format!("  {}", format!("╰{rule}╯").style(self.styles.muted)),
        ]
    }

    fn emit(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }

    pub fn step(&self, msg: &str) {
        self.emit(&self.mark_line(Mark::Step, msg));
    }

    pub fn success(&self, msg: &str) {
        self.emit(&self.mark_line(Mark::Done, msg));
    }

    pub fn warn(&self, msg: &str) {
        self.emit(&self.mark_line(Mark::Warn, msg));
    }

    /// Printed to stderr, even when quiet.
    pub fn error(&self, msg: &str) {
        eprintln!("{}", self.mark_line(Mark::Fail, msg));
    }

    pub fn info(&self, msg: &str) {
        self.emit(&self.mark_line(Mark::Note, msg));
    }

    pub fn header(&self, msg: &str) {
        self.emit(&format!("  {}", msg.style(self.styles.heading)));
    }

    pub fn kv(&self, key: &str, value: &str) {
        self.emit(&self.kv_line(key, value));
    }

    pub fn banner(&self, title: &str, subtitle: &str) {
        if self.quiet {
            return;
        }
        println!();
        for line in self.banner_lines(title, subtitle) {
            println!("{line}");
        }
        println!();
    }
}
