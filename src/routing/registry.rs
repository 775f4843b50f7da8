//! Downstream service registry.
//!
//! # Responsibilities
//! - Store logical service name → base URL entries
//! - Look up an entry for the first path segment of a request
//! - Return explicit no-match so the caller can answer 404
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Exact, case-sensitive match; no wildcard or prefix fallback
//! - Base URLs normalized once at load time (no trailing slash)

use std::collections::HashMap;

use thiserror::Error;
use url::Url;

/// Error raised while building a route entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("base URL for '{service}' is empty")]
    Empty { service: String },

    #[error("base URL for '{service}' is not absolute: {reason}")]
    NotAbsolute { service: String, reason: String },

    #[error("base URL for '{service}' has unsupported scheme '{scheme}'")]
    Scheme { service: String, scheme: String },
}

/// A single downstream service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    service_name: String,
    base_url: String,
}

impl RouteEntry {
    /// Validate and normalize a configured base URL.
    pub fn new(service_name: &str, base_url: &str) -> Result<Self, RegistryError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(RegistryError::Empty {
                service: service_name.to_string(),
            });
        }

        let parsed = Url::parse(trimmed).map_err(|e| RegistryError::NotAbsolute {
            service: service_name.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RegistryError::Scheme {
                service: service_name.to_string(),
                scheme: parsed.scheme().to_string(),
            });
        }

        Ok(Self {
            service_name: service_name.to_string(),
            base_url: trimmed.trim_end_matches('/').to_string(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Compose `base + "/" + path` with exactly one separating slash,
    /// appending the query string when present.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> String {
        let rest = path.strip_prefix('/').unwrap_or(path);
        let mut target = format!("{}/{}", self.base_url, rest);
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(q);
        }
        target
    }
}

/// Immutable lookup table of downstream services.
#[derive(Debug, Default)]
pub struct DownstreamRegistry {
    routes: HashMap<String, RouteEntry>,
}

impl DownstreamRegistry {
    /// Build the registry from `(service, base_url)` pairs.
    pub fn from_config<'a, I>(services: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut routes = HashMap::new();
        for (name, base_url) in services {
            let entry = RouteEntry::new(name, base_url)?;
            tracing::debug!(service = %name, base_url = %entry.base_url(), "Registered downstream service");
            routes.insert(name.clone(), entry);
        }
        Ok(Self { routes })
    }

    /// Exact-match lookup.
    pub fn resolve(&self, service: &str) -> Option<&RouteEntry> {
        self.routes.get(service)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
