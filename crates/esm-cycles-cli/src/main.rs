//! esm-cycles CLI - detect ECMAScript module import cycles.
//!
//! Parses arguments, initializes logging and colors, runs the check, and
//! maps the outcome to an exit code.

use clap::Parser;
use esm_cycles_cli::{cli, commands, error, logger, ui};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Parse command-line arguments
    let args = cli::Cli::parse();

    // Initialize logging and colors based on global flags
    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    match commands::check_execute(&args) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            // Convert CLI errors to miette diagnostics for readable reporting
            eprintln!("{:?}", error::cli_error_to_miette(err));
            ExitCode::from(2)
        }
    }
}
