//! Terminal output: status messages and the stylish report.
//!
//! Reports go to stdout; status lines go to stderr. Color is applied only
//! when stdout is a terminal and `NO_COLOR` is unset, or when `FORCE_COLOR`
//! asks for it.
//!
//! # Examples
//!
//! ```no_run
//! use esm_cycles_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("No problems found");
//! ```

mod format;
mod messages;

use owo_colors::{OwoColorize, Style};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_stylish, format_summary};
pub use messages::{success, warning};

static COLORS_ENABLED: AtomicBool = AtomicBool::new(false);

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    // NO_COLOR environment variable disables colors
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    // FORCE_COLOR enables colors even in non-TTY
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended()
}

/// Decide once whether output is colored.
///
/// `--no-color` wins over everything else.
pub fn init_colors(no_color: bool) {
    COLORS_ENABLED.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub fn colors_enabled() -> bool {
    COLORS_ENABLED.load(Ordering::Relaxed)
}

/// Render `text` with `style`, or as plain text when colors are off.
pub(crate) fn paint(text: impl Display, style: Style) -> String {
    if colors_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
