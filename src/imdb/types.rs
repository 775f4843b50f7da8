//! Provider payload and error definitions.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Movie metadata returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub title: Option<String>,
    pub id: Option<String>,
    pub stars: Option<String>,
    /// Kept as the provider's raw string; parsing happens at merge time.
    pub release_date: Option<String>,
}

impl MetadataRecord {
    /// Decode a loosely-typed provider object.
    ///
    /// Keys match ASCII case-insensitively and ignore underscores, so
    /// `releaseDate`, `ReleaseDate` and `release_date` are the same field.
    /// Unknown keys are ignored; `null` reads as absent.
    pub fn from_json(value: &Value) -> Result<Self, ImdbError> {
        let object = value
            .as_object()
            .ok_or_else(|| ImdbError::Decode(format!("expected a JSON object, got {}", kind(value))))?;

        let mut record = MetadataRecord::default();
        for (key, field) in object {
            let normalized: String = key
                .chars()
                .filter(|c| *c != '_')
                .map(|c| c.to_ascii_lowercase())
                .collect();
            let slot = match normalized.as_str() {
                "title" => &mut record.title,
                "id" => &mut record.id,
                "stars" => &mut record.stars,
                "releasedate" => &mut record.release_date,
                _ => continue,
            };
            *slot = scalar_to_string(field);
        }
        Ok(record)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Errors surfaced by the IMDB client.
#[derive(Debug, Error)]
pub enum ImdbError {
    /// Base URL missing or malformed.
    #[error("invalid IMDB base URL '{0}'")]
    Config(String),

    #[error("failed to build IMDB HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Non-transient 4xx; never retried.
    #[error("IMDB rejected the request with status {status}")]
    Rejected { status: StatusCode },

    /// Transient failures outlasted the retry budget.
    #[error("IMDB unavailable after {attempts} attempt(s): {reason}")]
    Unavailable { attempts: u32, reason: String },

    #[error("IMDB returned an unreadable payload: {0}")]
    Decode(String),

    #[error("IMDB call cancelled")]
    Cancelled,
}

impl ImdbError {
    /// True for failures a later call may not repeat.
    pub fn is_transient(&self) -> bool {
        matches!(self, ImdbError::Unavailable { .. } | ImdbError::Cancelled)
    }
}
