//! esm-cycles CLI - report ECMAScript import cycles and the bugs they cause.
//!
//! This crate provides the command-line interface over the `esm-cycles`
//! library: argument parsing, layered configuration, logging setup, and
//! terminal output.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions (clap derive)
//! - [`config`] - Defaults, config files, `ESM_CYCLES_*` variables, and flags merged with figment
//! - [`commands`] - The check itself
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Status lines and the stylish report
//!
//! # Example
//!
//! ```rust,no_run
//! use clap::Parser;
//! use esm_cycles_cli::{cli::Cli, commands, logger};
//!
//! fn main() -> esm_cycles_cli::Result<()> {
//!     logger::init_logger(0, false, false);
//!     let cli = Cli::parse_from(["esm-cycles", "src/index.js"]);
//!     let outcome = commands::check_execute(&cli)?;
//!     println!("{} errors", outcome.errors);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{CliError, ConfigError, Result};
