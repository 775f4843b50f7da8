//! IMDB liveness subsystem.
//!
//! # Data Flow
//! ```text
//! monitor.rs (one background task)
//!     → MetadataProvider::ping()
//!     → status.rs (atomic record: up, checks, last_call)
//!     → GET /status reads a snapshot
//! ```

pub mod monitor;
pub mod status;

pub use monitor::ImdbStatusMonitor;
pub use status::{ImdbStatus, ImdbStatusReader, StatusSnapshot};
