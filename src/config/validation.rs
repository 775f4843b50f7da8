//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Downstream base URLs are absolute http/https URLs
//! - IMDB base URL is present, timeout and retry count within range
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::routing::registry::RouteEntry;

pub const IMDB_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=120;
pub const IMDB_RETRY_RANGE: std::ops::RangeInclusive<u32> = 0..=10;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("DownstreamServices:{service} is invalid: {reason}")]
    DownstreamUrl { service: String, reason: String },

    #[error("Imdb:BaseUrl is required")]
    MissingImdbBaseUrl,

    #[error("Imdb:BaseUrl '{0}' is not an absolute http(s) URL")]
    InvalidImdbBaseUrl(String),

    #[error("Imdb:TimeoutSeconds must be between 1 and 120, got {0}")]
    ImdbTimeoutOutOfRange(u64),

    #[error("Imdb:RetryCount must be between 0 and 10, got {0}")]
    ImdbRetryOutOfRange(u32),

    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("status_monitor.interval_secs must be greater than zero")]
    MonitorInterval,
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    for (service, base_url) in &config.downstream_services {
        if let Err(e) = RouteEntry::new(service, base_url) {
            errors.push(ValidationError::DownstreamUrl {
                service: service.clone(),
                reason: e.to_string(),
            });
        }
    }

    let imdb = &config.imdb;
    if imdb.base_url.trim().is_empty() {
        errors.push(ValidationError::MissingImdbBaseUrl);
    } else {
        match url::Url::parse(imdb.base_url.trim()) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::InvalidImdbBaseUrl(imdb.base_url.clone())),
        }
    }
    if !IMDB_TIMEOUT_RANGE.contains(&imdb.timeout_secs) {
        errors.push(ValidationError::ImdbTimeoutOutOfRange(imdb.timeout_secs));
    }
    if !IMDB_RETRY_RANGE.contains(&imdb.retry_count) {
        errors.push(ValidationError::ImdbRetryOutOfRange(imdb.retry_count));
    }

    if config.status_monitor.enabled && config.status_monitor.interval_secs == 0 {
        errors.push(ValidationError::MonitorInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = GatewayConfig::default();
        config.imdb.base_url = "   ".into();
        config.imdb.timeout_secs = 0;
        config.imdb.retry_count = 11;
        config
            .downstream_services
            .insert("showtimes".into(), "ftp://showtimes.local".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MissingImdbBaseUrl));
        assert!(errors.contains(&ValidationError::ImdbTimeoutOutOfRange(0)));
        assert!(errors.contains(&ValidationError::ImdbRetryOutOfRange(11)));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::DownstreamUrl { service, .. } if service == "showtimes")));
    }

    #[test]
    fn relative_downstream_url_rejected() {
        let mut config = GatewayConfig::default();
        config
            .downstream_services
            .insert("movies".into(), "/movies".into());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn range_boundaries_accepted() {
        let mut config = GatewayConfig::default();
        config.imdb.timeout_secs = 120;
        config.imdb.retry_count = 0;
        assert!(validate_config(&config).is_ok());
        config.imdb.timeout_secs = 1;
        config.imdb.retry_count = 10;
        assert!(validate_config(&config).is_ok());
    }
}
