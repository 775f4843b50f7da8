//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → first path segment = logical service name
//!     → registry.rs (exact lookup)
//!     → Return: RouteEntry or None (answered with 404 by the forwarder)
//!
//! Registry construction (at startup):
//!     downstream_services map
//!     → validate + normalize base URLs
//!     → freeze as immutable DownstreamRegistry
//! ```
//!
//! # Design Decisions
//! - Registry built at startup, immutable at runtime
//! - Deterministic: same service name always resolves to the same entry

pub mod registry;

pub use registry::{DownstreamRegistry, RegistryError, RouteEntry};
