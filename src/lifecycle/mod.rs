//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate (fail fast) → Build service → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → cancel token → server drains, monitor loop exits,
//!     pending retries stop before their next attempt
//! ```

pub mod shutdown;

pub use shutdown::{wait_for_ctrl_c, Shutdown};
