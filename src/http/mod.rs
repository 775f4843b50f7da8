//! HTTP surface of the three services.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, shared middleware)
//!     → correlation.rs (assign id, request span, echo header)
//!     → proxy.rs   (gateway: registry lookup, forward, relay)
//!     → movies.rs  (IMDB lookups)
//!     → showtimes.rs (CRUD + status)
//!     → error.rs (problem-details bodies, panic boundary)
//! ```

pub mod correlation;
pub mod error;
pub mod movies;
pub mod proxy;
pub mod server;
pub mod showtimes;

pub use correlation::{CorrelationId, X_CORRELATION_ID};
pub use error::ProblemDetails;
pub use server::{HttpServer, StartupError};
