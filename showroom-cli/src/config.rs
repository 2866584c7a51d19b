//! Configuration loading for the showroom CLI.
//!
//! The file is TOML. The resolver section is required; cache and logging
//! settings have defaults.

use serde::Deserialize;
use showroom_core::ResolverConfig;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "SHOWROOM_CONFIG";
const DEFAULT_CACHE_MAX_SIZE_MB: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    pub resolver: ResolverConfig,
    /// LMDB directory. The cache lives in memory when unset.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
    #[serde(default = "default_cache_max_size_mb")]
    pub cache_max_size_mb: usize,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_cache_max_size_mb() -> usize {
    DEFAULT_CACHE_MAX_SIZE_MB
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or SHOWROOM_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Resolver(#[from] showroom_core::ConfigError),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl CliConfig {
    /// Load from `path`, falling back to `$SHOWROOM_CONFIG`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(config_path_from_env)
            .ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolver.validate()?;
        if self.cache_max_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_max_size_mb",
                reason: "must be > 0".to_string(),
            });
        }
        if let Some(path) = &self.cache_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "cache_path",
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}
