//! Error types for the CLI.

use crate::config::ConfigError;
use showroom_core::{ResolveError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cache store error: {0}")]
    Store(#[from] StoreError),
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to init logging: {0}")]
    Telemetry(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl From<showroom_core::ConfigError> for CliError {
    fn from(e: showroom_core::ConfigError) -> Self {
        Self::Config(ConfigError::Resolver(e))
    }
}
