//! Cinema gateway, movies and showtimes services.

pub mod config;
pub mod health;
pub mod http;
pub mod imdb;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod showtimes;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
