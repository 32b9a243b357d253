//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use esm_cycles::{AnalysisError, RuntimeError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Analysis(e) => analysis_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert AnalysisError to miette Report
pub fn analysis_error_to_miette(err: AnalysisError) -> Report {
    match err {
        AnalysisError::Runtime(RuntimeError::NotUtf8(path)) => miette::miette!(
            "Entrypoint is not valid UTF-8: {}\n\nHint: Only text source files can be analyzed",
            path.display()
        ),
        AnalysisError::Runtime(e) => miette::miette!("Unable to read entrypoint: {}", e),
        _ => miette::miette!("Analysis failed: {}", err),
    }
}
