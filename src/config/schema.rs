//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure shared by the
//! gateway, movies and showtimes services. All types derive Serde traits for
//! deserialization from TOML config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for all services.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Logical service name -> base URL of the downstream service.
    pub downstream_services: BTreeMap<String, String>,

    /// IMDB metadata provider client settings.
    pub imdb: ImdbConfig,

    /// Background IMDB liveness polling.
    pub status_monitor: StatusMonitorConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// IMDB client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImdbConfig {
    /// Provider base URL. Mandatory; an empty value fails startup.
    pub base_url: String,

    /// Per-attempt timeout in seconds (1-120).
    pub timeout_secs: u64,

    /// Number of retries after the first attempt (0-10).
    pub retry_count: u32,

    /// Backoff base in milliseconds. Retry n waits `base * 2^n`.
    pub backoff_base_ms: u64,
}

impl ImdbConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

impl Default for ImdbConfig {
    fn default() -> Self {
        Self {
            base_url: "https://imdb-api.com".to_string(),
            timeout_secs: 10,
            retry_count: 3,
            backoff_base_ms: 1000,
        }
    }
}

/// Liveness monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusMonitorConfig {
    /// Enable the background liveness loop (showtimes service only).
    pub enabled: bool,

    /// Seconds between two pings.
    pub interval_secs: u64,
}

impl Default for StatusMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
