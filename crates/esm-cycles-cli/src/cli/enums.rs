use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How the report is printed
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable rows grouped per file, like ESLint's stylish formatter
    #[default]
    #[value(name = "stylish")]
    Stylish,

    /// ESLint-compatible JSON lint results
    #[value(name = "json")]
    Json,
}
