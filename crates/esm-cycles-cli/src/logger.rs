//! Logging infrastructure for the esm-cycles CLI.
//!
//! Diagnostics about the analysis itself (which modules were parsed, which
//! module groups were linked, where cycles closed) are `tracing` events from
//! the library. This module decides which of them reach stderr.
//!
//! # Example
//!
//! ```rust,no_run
//! use esm_cycles_cli::logger::init_logger;
//! use tracing::debug;
//!
//! init_logger(1, false, false);
//! debug!(entry = "src/index.js", "analyzing entrypoint");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives for a verbosity level.
///
/// The level is determined in this order:
/// 1. `-vv`: TRACE for the esm-cycles crates
/// 2. `-v`: DEBUG for the esm-cycles crates
/// 3. `--quiet`: ERROR only
/// 4. `RUST_LOG`, if set
/// 5. WARN otherwise
pub fn filter_for(verbose: u8, quiet: bool) -> EnvFilter {
    match (verbose, quiet) {
        (0, true) => EnvFilter::new("error"),
        (0, false) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        (1, _) => EnvFilter::new("warn,esm_cycles=debug,esm_cycles_cli=debug"),
        _ => EnvFilter::new("warn,esm_cycles=trace,esm_cycles_cli=trace"),
    }
}

/// Initialize the tracing subscriber.
///
/// Call once, before any logging occurs. Logs always go to stderr so stdout
/// stays reserved for the report.
pub fn init_logger(verbose: u8, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
