//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Environment variable overriding `database.url`.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_ADDRESS: &str = "ADDRESS";
/// Environment variable overriding `health_check.name`.
pub const ENV_CHECK_NAME: &str = "DATABASE";

/// Load configuration: TOML file (if given), then environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_file(path)?,
        None => ServiceConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a TOML file, without environment overrides.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let config = parse_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides. Empty values are ignored.
pub fn apply_env_overrides<F>(mut config: ServiceConfig, lookup: F) -> ServiceConfig
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = var(ENV_DATABASE_URL) {
        config.database.url = url;
    }
    if let Some(address) = var(ENV_ADDRESS) {
        config.listener.bind_address = address;
    }
    if let Some(name) = var(ENV_CHECK_NAME) {
        config.health_check.name = name;
    }

    config
}
