//! IMDB HTTP client with bounded retries.
//!
//! # Responsibilities
//! - Hold the single base address and fixed timeout chosen at startup
//! - Liveness probe (`ping`) that never fails
//! - Title lookup (`fetch_by_id`) with retry on transient failures
//!
//! # Design Decisions
//! - Transport errors, 5xx, 408 and 429 are retried; other 4xx are not
//! - The API key travels in the path, so URLs are never logged

use async_trait::async_trait;
use reqwest::{Client, Response};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ImdbConfig;
use crate::imdb::types::{ImdbError, MetadataRecord};
use crate::imdb::MetadataProvider;
use crate::resilience::{is_transient_status, with_retry, RetryDecision, RetryError, RetryPolicy};

const PING_PATH: [&str; 2] = ["API", "Top250Movies"];

/// Client for the IMDB metadata API.
#[derive(Clone)]
pub struct ImdbClient {
    http: Client,
    base_url: Url,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl ImdbClient {
    /// Create a new client.
    ///
    /// `cancel` stops in-flight retry sequences on shutdown.
    pub fn new(config: &ImdbConfig, cancel: CancellationToken) -> Result<Self, ImdbError> {
        let trimmed = config.base_url.trim();
        if trimmed.is_empty() {
            return Err(ImdbError::Config(config.base_url.clone()));
        }
        let mut base_url = Url::parse(trimmed).map_err(|_| ImdbError::Config(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ImdbError::Config(config.base_url.clone()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ImdbError::Client)?;

        tracing::info!(
            base_url = %base_url,
            timeout_secs = config.timeout_secs,
            retries = config.retry_count,
            "IMDB client initialized"
        );

        Ok(Self {
            http,
            base_url,
            policy: RetryPolicy::from_config(config),
            cancel,
        })
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Liveness probe. Any failure, including retry exhaustion, is `false`.
    pub async fn ping(&self) -> bool {
        match self.get_with_retry(self.endpoint(&PING_PATH)).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "IMDB ping failed");
                false
            }
        }
    }

    /// Look up a title by its IMDB identifier.
    pub async fn fetch_by_id(&self, imdb_id: &str, api_key: &str) -> Result<MetadataRecord, ImdbError> {
        let url = self.endpoint(&["API", "Title", api_key, imdb_id]);
        let response = self.get_with_retry(url).await?;
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ImdbError::Decode(e.without_url().to_string()))?;

        let record = MetadataRecord::from_json(&payload)?;
        tracing::debug!(imdb_id = %imdb_id, title = ?record.title, "IMDB title fetched");
        Ok(record)
    }

    async fn get_with_retry(&self, url: Url) -> Result<Response, ImdbError> {
        let outcome = with_retry(&self.policy, &self.cancel, classify, |attempt| {
            let request = self.http.get(url.clone());
            async move {
                tracing::debug!(attempt, "Calling IMDB");
                request.send().await
            }
        })
        .await;

        match outcome {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    Ok(response)
                } else if is_transient_status(status) {
                    Err(ImdbError::Unavailable {
                        attempts: self.policy.total_attempts(),
                        reason: format!("status {status}"),
                    })
                } else {
                    tracing::warn!(status = %status, "IMDB rejected request");
                    Err(ImdbError::Rejected { status })
                }
            }
            Err(RetryError::Failed { attempts, source }) => Err(ImdbError::Unavailable {
                attempts,
                reason: source.without_url().to_string(),
            }),
            Err(RetryError::TimedOut { attempts, timeout }) => Err(ImdbError::Unavailable {
                attempts,
                reason: format!("timed out after {timeout:?}"),
            }),
            Err(RetryError::Cancelled { .. }) => Err(ImdbError::Cancelled),
        }
    }
}

fn classify(result: &Result<Response, reqwest::Error>) -> RetryDecision {
    match result {
        Ok(response) if is_transient_status(response.status()) => RetryDecision::Retry,
        Ok(_) => RetryDecision::Done,
        Err(e) if e.is_builder() => RetryDecision::Done,
        Err(_) => RetryDecision::Retry,
    }
}

impl std::fmt::Debug for ImdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImdbClient")
            .field("base_url", &self.base_url.as_str())
            .field("policy", &self.policy)
            .finish()
    }
}

#[async_trait]
impl MetadataProvider for ImdbClient {
    async fn ping(&self) -> bool {
        ImdbClient::ping(self).await
    }

    async fn fetch_by_id(&self, imdb_id: &str, api_key: &str) -> Result<MetadataRecord, ImdbError> {
        ImdbClient::fetch_by_id(self, imdb_id, api_key).await
    }
}
