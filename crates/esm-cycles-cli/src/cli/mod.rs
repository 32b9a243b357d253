//! Command-line interface definition for esm-cycles.
//!
//! There is a single command: analyze the given entrypoints and report
//! import cycles and the imports they make unsafe.
//!
//! ```text
//! esm-cycles [OPTIONS] [ENTRY]...
//! ```

pub mod enums;
mod validation;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

pub use enums::OutputFormat;
pub use validation::normalize_extensions;

/// esm-cycles - detect ECMAScript module import cycles
#[derive(Parser, Debug)]
#[command(
    name = "esm-cycles",
    version,
    about = "Detect module cycles.",
    long_about = "Statically replays ECMAScript module linking and evaluation from the given\n\
                  entrypoints, reporting import cycles and imports that are used before the\n\
                  module defining them has been evaluated."
)]
pub struct Cli {
    /// The scripts that are the entry points to your application
    ///
    /// Directories resolve through the `main` field of their package.json,
    /// then through `index` files. May also be set in the config file.
    #[arg(value_name = "ENTRY")]
    pub entrypoints: Vec<String>,

    /// JavaScript file extensions
    ///
    /// Repeatable and comma separated; a missing leading dot is added.
    /// When given, replaces the default of `.js`.
    ///
    /// Examples:
    ///   esm-cycles src/index.ts --ext .ts
    ///   esm-cycles src/index.ts --ext ts,tsx --ext .js
    #[arg(long = "ext", value_name = "EXT", action = ArgAction::Append)]
    pub ext: Vec<String>,

    /// Displays warnings (import cycles) as well as errors
    #[arg(long, visible_alias = "all-cycles", alias = "allCycles")]
    pub warnings: bool,

    /// Output format for the report
    #[arg(short = 'f', long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to a config file (esm-cycles.config.json or esm-cycles.toml)
    ///
    /// Without this flag the nearest config file in the current directory
    /// or one of its parents is used, if any.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
