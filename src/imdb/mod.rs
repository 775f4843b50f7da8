//! IMDB metadata provider.
//!
//! # Data Flow
//! ```text
//! Movies API / enrichment / liveness monitor
//!     → MetadataProvider (trait)
//!     → client.rs (reqwest + with_retry)
//!     → types.rs (case-insensitive payload decode, ImdbError)
//! ```

use async_trait::async_trait;

pub mod client;
pub mod types;

pub use client::ImdbClient;
pub use types::{ImdbError, MetadataRecord};

/// Source of movie metadata.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Whether the provider currently answers. Never fails.
    async fn ping(&self) -> bool;

    async fn fetch_by_id(&self, imdb_id: &str, api_key: &str) -> Result<MetadataRecord, ImdbError>;
}
