//! Stylish report formatting, one block per file.

use esm_cycles::{LintMessage, LintResult, Severity};
use owo_colors::Style;
use std::fmt::Write as _;

use super::paint;

/// Format lint results the way ESLint's `stylish` formatter does.
///
/// Each file gets its path, then one row per message:
/// `line:column  severity  message  rule-id`. Continuation lines of a
/// multi-line message are indented to the message column. A summary line
/// closes the report. No results give an empty string.
///
/// # Examples
///
/// ```
/// use esm_cycles_cli::ui::format_stylish;
///
/// assert_eq!(format_stylish(&[]), "");
/// ```
pub fn format_stylish(results: &[LintResult]) -> String {
    let mut out = String::new();
    let mut errors = 0;
    let mut warnings = 0;

    for result in results.iter().filter(|result| !result.messages.is_empty()) {
        errors += result.error_count;
        warnings += result.warning_count;

        let _ = writeln!(
            out,
            "\n{}",
            paint(result.file_path.display(), Style::new().underline())
        );

        let positions: Vec<String> = result
            .messages
            .iter()
            .map(|message| format!("{}:{}", message.line, message.column))
            .collect();
        let position_width = positions.iter().map(String::len).max().unwrap_or(0);
        let severity_width = result
            .messages
            .iter()
            .map(|message| message.severity.as_str().len())
            .max()
            .unwrap_or(0);
        let indent = " ".repeat(2 + position_width + 2 + severity_width + 2);

        for (message, position) in result.messages.iter().zip(&positions) {
            let _ = writeln!(
                out,
                "  {}  {}  {}  {}",
                paint(format!("{position:<position_width$}"), Style::new().dimmed()),
                severity_label(message, severity_width),
                message.message.replace('\n', &format!("\n{indent}")),
                paint(&message.rule_id, Style::new().dimmed()),
            );
        }
    }

    if errors + warnings > 0 {
        let _ = writeln!(out, "\n{}", format_summary(errors, warnings));
    }
    out
}

fn severity_label(message: &LintMessage, width: usize) -> String {
    let label = format!("{:<width$}", message.severity.as_str());
    match message.severity {
        Severity::Error => paint(label, Style::new().red()),
        Severity::Warning => paint(label, Style::new().yellow()),
    }
}

/// The closing `✖ N problems (E errors, W warnings)` line.
pub fn format_summary(errors: usize, warnings: usize) -> String {
    let total = errors + warnings;
    let text = format!(
        "✖ {total} {} ({errors} {}, {warnings} {})",
        plural(total, "problem"),
        plural(errors, "error"),
        plural(warnings, "warning"),
    );
    let style = if errors > 0 {
        Style::new().red().bold()
    } else {
        Style::new().yellow().bold()
    };
    paint(text, style)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
