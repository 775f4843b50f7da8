//! Cinema services
//!
//! One binary, three services, chosen on the command line.
//!
//! ```text
//!                      ┌──────────────────────────────┐
//!   Client ──────────▶ │ gateway  /{service}/{*path}  │
//!                      └──────┬───────────────┬───────┘
//!                             │               │
//!                             ▼               ▼
//!                  ┌────────────────┐  ┌────────────────────┐
//!                  │ movies         │  │ showtimes          │
//!                  │ /movies/...    │  │ /showtime, /status │
//!                  └───────┬────────┘  └─────────┬──────────┘
//!                          │   retries/backoff   │
//!                          └─────────┬───────────┘
//!                                    ▼
//!                                IMDB API
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;

use cinema_gateway::config::{load_config, load_from_env, ConfigError, GatewayConfig};
use cinema_gateway::lifecycle::{wait_for_ctrl_c, Shutdown};
use cinema_gateway::observability::{init_logging, metrics};
use cinema_gateway::HttpServer;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Service {
    Gateway,
    Movies,
    Showtimes,
}

#[derive(Parser)]
#[command(name = "cinema-gateway")]
#[command(about = "Cinema gateway, movies and showtimes services", long_about = None)]
struct Cli {
    /// TOML config file; defaults plus environment overrides when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(value_enum)]
    service: Service,
}

fn load(cli: &Cli) -> Result<GatewayConfig, ConfigError> {
    match &cli.config {
        Some(path) => load_config(path),
        None => load_from_env(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);
    tracing::info!(service = ?cli.service, version = env!("CARGO_PKG_VERSION"), "cinema-gateway starting");

    match run(cli.service, config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(service: Service, config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let server = match service {
        Service::Gateway => HttpServer::gateway(&config)?,
        Service::Movies => HttpServer::movies(&config, &shutdown)?,
        Service::Showtimes => HttpServer::showtimes(&config, &shutdown)?,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        request_timeout_secs = config.timeouts.request_secs,
        "Listening for connections"
    );

    tokio::spawn(wait_for_ctrl_c(shutdown.clone()));
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
