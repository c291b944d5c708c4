//! Layered configuration
//!
//! Sources, lowest priority first:
//!
//! 1. compiled-in defaults
//! 2. `symbolista.toml` in the working directory, or the file passed with `--config`
//! 3. `SYMBOLISTA_*` environment variables, `__` separating section and key
//!    (`SYMBOLISTA_ANALYSIS__WORKERS=4`)
//!
//! Command-line flags are applied on top of the extracted [`Config`] by the CLI.

use crate::analysis::{AnalysisConfig, SequenceConfig};
use crate::output::OutputFormat;
use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "symbolista.toml";
/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "SYMBOLISTA_";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub sequences: SequenceConfig,
    pub output: OutputConfig,
}

/// Settings for rendering a finished analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub percentages: bool,
    /// Include run metadata in JSON output
    pub metadata: bool,
    /// Show the progress spinner (only ever drawn on a terminal)
    pub progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            percentages: true,
            metadata: true,
            progress: true,
        }
    }
}

impl Config {
    /// Load defaults, the config file and environment overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        tracing::trace!("Loading configuration");
        let config: Config = Self::figment(config_file)
            .extract()
            .context("Failed to load configuration")?;
        config.validate()?;
        tracing::debug!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    /// The merged provider chain, before extraction
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let file = match config_file {
            Some(path) => {
                if !path.exists() {
                    tracing::warn!("Config file not found: {}", path.display());
                }
                Toml::file(path)
            }
            None => Toml::file(DEFAULT_CONFIG_FILE),
        };

        Figment::from(Serialized::defaults(Config::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        self.sequences
            .validate()
            .context("Invalid [sequences] configuration")
    }
}
