//! Colors for terminal output.

use owo_colors::Style;

/// Styles for status marks and labels. Plain unless built with `colored`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Styles {
    pub done: Style,
    pub warn: Style,
    pub fail: Style,
    /// Phase starts and notes.
    pub step: Style,
    /// Key columns and the banner frame.
    pub muted: Style,
    /// Headers and the banner title.
    pub heading: Style,
}

impl Styles {
    #[must_use]
    pub fn colored() -> Self {
        Self {
            done: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red(),
            step: Style::new().blue(),
            muted: Style::new().dimmed(),
            heading: Style::new().bold().truecolor(26, 151, 179),
        }
    }
}
