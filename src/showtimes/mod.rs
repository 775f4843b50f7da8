//! Showtimes subsystem.
//!
//! # Data Flow
//! ```text
//! POST/PUT /showtime
//!     → service.rs (validate input)
//!     → enrichment.rs (fetch metadata, null-coalescing merge)
//!     → repository.rs (key-indexed store)
//! ```

pub mod enrichment;
pub mod model;
pub mod repository;
pub mod service;

pub use model::{Movie, Showtime};
pub use repository::{InMemoryShowtimes, RepositoryError, ShowtimesRepository};
pub use service::{ShowtimesError, ShowtimesService};
