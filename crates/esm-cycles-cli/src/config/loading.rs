use crate::cli::{Cli, OutputFormat, normalize_extensions};
use crate::config::CyclesConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file names, in lookup order within a directory.
pub const CONFIG_FILE_NAMES: &[&str] = &["esm-cycles.config.json", "esm-cycles.toml"];

const ENV_PREFIX: &str = "ESM_CYCLES_";
const ENV_KEYS: &[&str] = &["entrypoints", "extensions", "warnings", "format"];

/// Settings given explicitly on the command line. Unset flags are left out
/// so they don't mask lower-priority sources.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    entrypoints: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<OutputFormat>,
}

impl CliOverrides {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            entrypoints: (!cli.entrypoints.is_empty()).then(|| cli.entrypoints.clone()),
            extensions: (!cli.ext.is_empty()).then(|| normalize_extensions(&cli.ext)),
            warnings: cli.warnings.then_some(true),
            format: cli.format,
        }
    }
}

/// Find the nearest config file in `start` or one of its parents.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

impl CyclesConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(cli: &Cli, cwd: &Path) -> Result<Self> {
        let config_file = match &cli.config {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    cwd.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => find_config_file(cwd),
        };
        if let Some(path) = &config_file {
            debug!(path = %path.display(), "using config file");
        }

        let mut config: Self = Self::figment(config_file.as_deref(), CliOverrides::from_cli(cli))
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        config.extensions = normalize_extensions(&config.extensions);
        if config.extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "extensions".to_string(),
                value: "[]".to_string(),
                hint: "List at least one extension, e.g. [\".js\"]".to_string(),
            }
            .into());
        }
        Ok(config)
    }

    fn figment(config_file: Option<&Path>, overrides: CliOverrides) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                _ => figment.merge(Json::file(path)),
            };
        }

        // ESM_CYCLES_WARNINGS, ESM_CYCLES_FORMAT, ...
        figment
            .merge(Env::prefixed(ENV_PREFIX).only(ENV_KEYS))
            .merge(Serialized::defaults(overrides))
    }
}
