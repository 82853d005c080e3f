//! Configuration loading from multiple sources

use crate::{AppConfig, ConfigError, Result};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LEVERAGE_PLANNER";

/// Configuration loader with support for multiple formats and sources
pub struct ConfigLoader;

fn env_source(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn file_format(path: &Path) -> Result<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(FileFormat::Toml),
        Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
        Some("json") => Ok(FileFormat::Json),
        Some(other) => Err(ConfigError::LoadError(format!(
            "Unsupported file extension: {other}"
        ))),
        None => Err(ConfigError::LoadError("No file extension found".to_string())),
    }
}

impl ConfigLoader {
    /// Load configuration from a file
    ///
    /// Supports TOML, YAML, and JSON formats based on file extension
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let format = file_format(path)?;
        let content = std::fs::read_to_string(path)?;

        match format {
            FileFormat::Yaml => Self::from_yaml(&content),
            FileFormat::Json => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<AppConfig> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(content: &str) -> Result<AppConfig> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from JSON string
    pub fn from_json(content: &str) -> Result<AppConfig> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from environment variables
    ///
    /// Uses default prefix "LEVERAGE_PLANNER"
    pub fn from_env() -> Result<AppConfig> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load configuration from environment variables with custom prefix
    ///
    /// Nested keys are separated by a double underscore:
    /// `LEVERAGE_PLANNER_PLANNER__MINT_STRATEGY=v1` sets `planner.mint_strategy`.
    pub fn from_env_with_prefix(prefix: &str) -> Result<AppConfig> {
        let config = Config::builder().add_source(env_source(prefix)).build()?;

        config.try_deserialize().map_err(ConfigError::from)
    }

    /// Merge two configurations, with overlay taking precedence
    ///
    /// Logging and planner sections come from the overlay; named chains,
    /// venues and tokens are combined, overlay entries replacing base entries.
    pub fn merge(base: AppConfig, overlay: AppConfig) -> AppConfig {
        let mut chains = base.chains;
        chains.extend(overlay.chains);
        let mut venues = base.venues;
        venues.extend(overlay.venues);
        let mut tokens = base.tokens;
        tokens.extend(overlay.tokens);

        AppConfig {
            logging: overlay.logging,
            planner: overlay.planner,
            chains,
            venues,
            tokens,
        }
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment values are layered key by key over the file.
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<AppConfig> {
        Self::builder()
            .add_file(path, true)
            .add_env(env_prefix)
            .build()
    }

    /// Build configuration using the config crate's builder pattern
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder {
            builder: Config::builder(),
            error: None,
        }
    }
}

/// Builder for layered configuration loading
pub struct ConfigLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
    error: Option<ConfigError>,
}

impl ConfigLoaderBuilder {
    /// Add a configuration file source
    pub fn add_file(mut self, path: &Path, required: bool) -> Self {
        let format = file_format(path).unwrap_or(FileFormat::Toml);
        self.builder = self
            .builder
            .add_source(File::from(path).format(format).required(required));
        self
    }

    /// Add environment variable source with prefix
    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(env_source(prefix));
        self
    }

    /// Set a default value for a key
    pub fn set_default(mut self, key: &str, value: &str) -> Self {
        match self.builder.set_default(key, value) {
            Ok(builder) => self.builder = builder,
            Err(e) => {
                self.error.get_or_insert(ConfigError::from(e));
                self.builder = Config::builder();
            }
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<AppConfig> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let config = self.builder.build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }
}
