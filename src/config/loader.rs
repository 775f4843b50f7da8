//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

const DOWNSTREAM_PREFIX: &str = "DownstreamServices__";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid override {key}={value}")]
    Override { key: String, value: String },

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

/// Load, override from the process environment, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;
    apply_overrides(&mut config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Defaults plus environment overrides, validated. Used when no file is given.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_overrides(&mut config, std::env::vars())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply `Section__Key` style overrides.
///
/// Recognized keys: `DownstreamServices__{service}`, `Listener__BindAddress`,
/// `Imdb__BaseUrl`, `Imdb__TimeoutSeconds`, `Imdb__RetryCount`,
/// `Imdb__BackoffBaseMs`.
/// Service names keep their case because lookups are case-sensitive.
pub fn apply_overrides<I>(config: &mut GatewayConfig, vars: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(service) = key.strip_prefix(DOWNSTREAM_PREFIX) {
            if !service.is_empty() {
                config
                    .downstream_services
                    .insert(service.to_string(), value);
            }
            continue;
        }

        match key.as_str() {
            "Listener__BindAddress" => config.listener.bind_address = value,
            "Imdb__BaseUrl" => config.imdb.base_url = value,
            "Imdb__TimeoutSeconds" => config.imdb.timeout_secs = parse_number(&key, &value)?,
            "Imdb__RetryCount" => config.imdb.retry_count = parse_number(&key, &value)?,
            "Imdb__BackoffBaseMs" => config.imdb.backoff_base_ms = parse_number(&key, &value)?,
            _ => {}
        }
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Override {
        key: key.to_string(),
        value: value.to_string(),
    })
}
