//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use cinema_gateway::config::GatewayConfig;
use cinema_gateway::HttpServer;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

type Responder = dyn Fn(u32) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync;

/// A request as the mock backend saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: Method,
    /// Path plus query, exactly as received.
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

struct Inner {
    calls: AtomicU32,
    captured: Mutex<Vec<Captured>>,
    respond: Box<Responder>,
}

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    inner: Arc<Inner>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> u32 {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.inner.captured.lock().unwrap().clone()
    }

    pub fn last(&self) -> Captured {
        self.captured().pop().expect("backend received no request")
    }
}

/// Start a programmable backend. `respond` gets the 1-indexed call number.
pub async fn start_backend<F, Fut>(respond: F) -> MockBackend
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let inner = Arc::new(Inner {
        calls: AtomicU32::new(0),
        captured: Mutex::new(Vec::new()),
        respond: Box::new(move |n| Box::pin(respond(n))),
    });

    let app = Router::new().fallback(record).with_state(inner.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, inner }
}

/// Backend answering every call with the same status and body.
pub async fn start_fixed_backend(status: StatusCode, body: &'static str) -> MockBackend {
    start_backend(move |_| async move { (status, body).into_response() }).await
}

async fn record(State(inner): State<Arc<Inner>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let n = inner.calls.fetch_add(1, Ordering::SeqCst) + 1;
    inner.captured.lock().unwrap().push(Captured {
        method: parts.method,
        uri: parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        headers: parts.headers,
        body,
    });
    (inner.respond)(n).await
}

/// An address with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Run `server` on an ephemeral port until the returned token is cancelled.
pub async fn spawn_server(server: HttpServer) -> (SocketAddr, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        server.run(listener, shutdown).await.unwrap();
    });
    (addr, token)
}

/// Gateway config routing `services` (name, base URL).
pub fn gateway_config(services: &[(&str, String)]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    for (name, url) in services {
        config.downstream_services.insert(name.to_string(), url.clone());
    }
    config
}

/// Gateway routing `services` (name, base URL).
pub async fn start_gateway(services: &[(&str, String)]) -> SocketAddr {
    start_gateway_with(&gateway_config(services)).await
}

pub async fn start_gateway_with(config: &GatewayConfig) -> SocketAddr {
    let (addr, _) = spawn_server(HttpServer::gateway(config).unwrap()).await;
    addr
}

/// JSON response helper for mock IMDB payloads.
pub fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
    (status, axum::Json(body)).into_response()
}

/// Raw response without a content type.
pub fn untyped_response(status: StatusCode, body: &'static str) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}
