//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, pretty or JSON)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Every request runs inside a span carrying its correlation_id, so each
//! log line emitted while handling it is tagged with the same id.
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
