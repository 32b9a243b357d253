//! Configuration with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;

use serde::{Deserialize, Serialize};

pub use crate::cli::OutputFormat;
pub use defaults::*;
pub use loading::{CONFIG_FILE_NAMES, find_config_file};

/// esm-cycles configuration, loaded from esm-cycles.config.json,
/// esm-cycles.toml, `ESM_CYCLES_*` variables, or CLI args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CyclesConfig {
    /// Entry points to analyze (e.g., ["src/index.js"])
    #[serde(default)]
    pub entrypoints: Vec<String>,

    /// Extensions tried when resolving relative specifiers
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Include import cycle warnings in the report
    #[serde(default)]
    pub warnings: bool,

    /// Report format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

impl Default for CyclesConfig {
    fn default() -> Self {
        Self {
            entrypoints: Vec::new(),
            extensions: default_extensions(),
            warnings: false,
            format: default_format(),
        }
    }
}
