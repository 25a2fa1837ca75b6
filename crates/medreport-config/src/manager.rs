//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use tracing::debug;

use crate::{
    error::{ConfigError, Result},
    types::AppConfig,
};

const ENV_PREFIX: &str = "MEDREPORT";

/// Loads and validates [`AppConfig`]
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
    /// Replaces the process environment when set
    env_source: Option<config::Map<String, String>>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Create with custom config path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            env_prefix: ENV_PREFIX.to_string(),
            env_source: None,
        }
    }

    /// Read environment overrides from `vars` instead of the process environment
    pub fn with_env_source(mut self, vars: config::Map<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("medreport")
            .join("config.toml")
    }

    /// Merge file and environment sources, then validate
    pub fn load_config(&self) -> Result<AppConfig> {
        debug!("Loading configuration from {}", self.config_path.display());

        let env = Environment::with_prefix(&self.env_prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(self.env_source.clone());

        let config = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(env)
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        self.validate_config(&app_config)?;
        Ok(app_config)
    }

    pub fn validate_config(&self, config: &AppConfig) -> Result<()> {
        let base = url::Url::parse(&config.api.base_url).map_err(|e| {
            ConfigError::Validation(format!("Invalid api.base_url '{}': {e}", config.api.base_url))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "api.base_url must be http or https, got '{}'",
                base.scheme()
            )));
        }
        if config.health.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "health.interval_ms must be greater than 0".to_string(),
            ));
        }
        if config.health.retry_delay_ms == 0 {
            return Err(ConfigError::Validation(
                "health.retry_delay_ms must be greater than 0".to_string(),
            ));
        }
        if config.health.probe_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "health.probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
