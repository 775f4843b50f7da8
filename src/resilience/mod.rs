//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the metadata provider:
//!     → retries.rs (per-attempt timeout, classify outcome)
//!     → On transient failure: backoff.rs (base * 2^n), then retry
//!     → On cancellation: stop before the next attempt or mid-sleep
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has its own deadline
//! - Only the metadata provider path retries; generic proxying never does
//! - Non-transient 4xx are returned on the first attempt

pub mod backoff;
pub mod retries;

pub use backoff::calculate_backoff;
pub use retries::{is_transient_status, with_retry, RetryDecision, RetryError, RetryPolicy};
