//! Error handling for the esm-cycles CLI.
//!
//! Every failure the CLI itself can hit is a [`CliError`]. Problems found in
//! the analyzed sources are not errors: they are issues, reported through
//! the normal output and the exit code.
//!
//! # Example
//!
//! ```rust
//! use esm_cycles_cli::error::{CliError, ConfigError};
//! use std::path::PathBuf;
//!
//! let err: CliError = ConfigError::NotFound(PathBuf::from("esm-cycles.toml")).into();
//! assert!(err.to_string().contains("Hint:"));
//! ```

pub mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Neither the command line nor a config file named an entrypoint
    #[error("At least one entrypoint must be provided.\n\nHint: Pass entry files as arguments, e.g. 'esm-cycles src/index.js'")]
    NoEntrypoints,

    /// An entrypoint did not resolve to a file
    #[error("Entrypoint not found: {}\n\nHint: Check the path, or add its extension with --ext", .0.display())]
    EntrypointNotFound(PathBuf),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The analysis could not read an entrypoint
    #[error("Analysis failed: {0}")]
    Analysis(#[from] esm_cycles::AnalysisError),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create an esm-cycles.toml file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// The merged configuration could not be extracted
    #[error("Invalid configuration: {0}\n\nHint: Check the config file syntax and ESM_CYCLES_* variables")]
    Invalid(String),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
