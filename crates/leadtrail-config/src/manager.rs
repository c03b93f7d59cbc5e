//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    types::{ConfigLoader, TrackingConfig},
};

/// Default environment prefix, e.g. `LEADTRAIL_DEVELOPMENT=true`
pub const ENV_PREFIX: &str = "LEADTRAIL";

/// Configuration manager
///
/// Layers, lowest precedence first: built-in defaults, the TOML file (optional),
/// then environment variables. Nested keys use a double underscore:
/// `LEADTRAIL_SINK__KIND=http`.
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate in one step
    pub fn load(&mut self) -> Result<TrackingConfig> {
        let config = self.load_config()?;
        self.validate_config(&config)?;
        Ok(config)
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leadtrail")
            .join("config.toml")
    }
}

impl ConfigLoader for ConfigManager {
    fn load_config(&mut self) -> Result<TrackingConfig> {
        debug!(path = %self.config_path.display(), "Loading configuration");

        let builder = Config::builder()
            .add_source(
                File::from(self.config_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("scroll_milestones"),
            );

        let config = builder.build()?;
        let tracking: TrackingConfig = config.try_deserialize()?;
        Ok(tracking)
    }

    fn save_config(&self, config: &TrackingConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        info!(path = %self.config_path.display(), "Saved configuration");
        Ok(())
    }

    fn validate_config(&self, config: &TrackingConfig) -> Result<()> {
        config.validate()?;

        if let Some(path) = &config.funnels_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
