//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router for one service (gateway, movies or showtimes)
//! - Wire up middleware (tracing, correlation id, timeout, panic boundary)
//! - Spawn background tasks the service owns (IMDB liveness monitor)
//! - Serve until the shutdown token fires

use std::sync::Arc;
use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{on, MethodFilter};
use axum::{BoxError, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::timeout::error::Elapsed;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::health::{ImdbStatus, ImdbStatusMonitor};
use crate::http::correlation::correlation_middleware;
use crate::http::error::{handle_panic, ProblemDetails};
use crate::http::proxy::{forward, ProxyState};
use crate::http::showtimes::ShowtimesState;
use crate::http::{movies, showtimes};
use crate::imdb::{ImdbClient, ImdbError, MetadataProvider};
use crate::lifecycle::Shutdown;
use crate::routing::{DownstreamRegistry, RegistryError};
use crate::showtimes::{InMemoryShowtimes, ShowtimesService};

const PROXY_METHODS: MethodFilter = MethodFilter::GET
    .or(MethodFilter::POST)
    .or(MethodFilter::PUT)
    .or(MethodFilter::DELETE)
    .or(MethodFilter::PATCH);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("downstream registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("IMDB client: {0}")]
    Imdb(#[from] ImdbError),

    #[error("outbound TLS: {0}")]
    Tls(#[from] rustls::Error),
}

/// Turn middleware errors into problem bodies. An elapsed request timeout is a 504.
async fn handle_middleware_error(err: BoxError) -> ProblemDetails {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        ProblemDetails::new(StatusCode::GATEWAY_TIMEOUT, "The request did not complete in time")
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        ProblemDetails::internal("An unexpected error occurred")
    }
}

/// Wrap `router` in the middleware every service shares.
///
/// Outermost first: trace span, correlation id, request timeout, panic boundary.
pub fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router.fallback(|| async { StatusCode::NOT_FOUND }).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(correlation_middleware))
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

/// Gateway routes: `/{service}` and `/{service}/{*path}`.
pub fn gateway_routes(state: ProxyState) -> Router {
    Router::new()
        .route("/{service}", on(PROXY_METHODS, forward))
        .route("/{service}/{*path}", on(PROXY_METHODS, forward))
        .with_state(state)
}

/// One HTTP service, ready to run.
pub struct HttpServer {
    name: &'static str,
    router: Router,
    monitor: Option<ImdbStatusMonitor>,
}

impl HttpServer {
    /// The reverse proxy in front of the downstream services.
    pub fn gateway(config: &GatewayConfig) -> Result<Self, StartupError> {
        let registry = DownstreamRegistry::from_config(&config.downstream_services)?;
        tracing::info!(services = registry.len(), "Downstream registry loaded");

        Ok(Self::new("gateway", gateway_routes(ProxyState::new(registry)?), config, None))
    }

    /// IMDB lookups.
    pub fn movies(config: &GatewayConfig, shutdown: &Shutdown) -> Result<Self, StartupError> {
        let provider: Arc<dyn MetadataProvider> = Arc::new(ImdbClient::new(&config.imdb, shutdown.subscribe())?);
        Ok(Self::new("movies", movies::routes(provider), config, None))
    }

    /// Showtime CRUD plus the IMDB liveness monitor.
    pub fn showtimes(config: &GatewayConfig, shutdown: &Shutdown) -> Result<Self, StartupError> {
        let provider: Arc<dyn MetadataProvider> = Arc::new(ImdbClient::new(&config.imdb, shutdown.subscribe())?);
        let status = ImdbStatus::new();
        let state = ShowtimesState {
            service: ShowtimesService::new(Arc::new(InMemoryShowtimes::new()), provider.clone()),
            status: status.reader(),
        };

        let monitor = config
            .status_monitor
            .enabled
            .then(|| ImdbStatusMonitor::new(provider, status, &config.status_monitor));
        Ok(Self::new("showtimes", showtimes::routes(state), config, monitor))
    }

    fn new(name: &'static str, routes: Router, config: &GatewayConfig, monitor: Option<ImdbStatusMonitor>) -> Self {
        let router = with_middleware(routes, Duration::from_secs(config.timeouts.request_secs));
        Self { name, router, monitor }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: CancellationToken) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(service = self.name, address = %addr, "HTTP server starting");

        if let Some(monitor) = self.monitor {
            tokio::spawn(monitor.run(shutdown.child_token()));
        } else if self.name == "showtimes" {
            tracing::info!("IMDB status monitor disabled");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        tracing::info!(service = self.name, "HTTP server stopped");
        Ok(())
    }
}
