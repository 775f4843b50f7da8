//! Gateway proxy forwarder.
//!
//! # Responsibilities
//! - Resolve `/{service}/{*path}` against the downstream registry
//! - Rebuild the request for the target: headers, streamed body, query
//! - Relay status, headers and body back unchanged (minus `transfer-encoding`)
//!
//! # Design Decisions
//! - No retries: a forwarded POST may not be idempotent
//! - Bodies are streamed in both directions, never buffered
//! - `Host` is set by the client from the target URI
//! - The request's correlation id travels downstream

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::http::correlation::CorrelationId;
use crate::http::error::ProblemDetails;
use crate::observability::metrics;
use crate::routing::DownstreamRegistry;

pub type ProxyClient = Client<HttpsConnector<HttpConnector>, Body>;

type Downstream = hyper::Response<Incoming>;

const OCTET_STREAM: &str = "application/octet-stream";

/// Build the pooled outbound client (http and https targets).
///
/// The rustls crypto provider is passed explicitly; the process-level
/// default is ambiguous once more than one provider is compiled in.
pub fn build_client() -> Result<ProxyClient, rustls::Error> {
    let connector = HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
        .https_or_http()
        .enable_http1()
        .build();
    Ok(Client::builder(TokioExecutor::new()).build(connector))
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Unknown service '{0}'")]
    UnknownService(String),

    #[error("invalid target URL '{0}'")]
    InvalidTarget(String),

    #[error("{0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::UnknownService(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            ProxyError::InvalidTarget(_) | ProxyError::Transport(_) => {
                ProblemDetails::internal(self.to_string()).into_response()
            }
        }
    }
}

/// Shared forwarder state.
#[derive(Clone)]
pub struct ProxyState {
    pub registry: Arc<DownstreamRegistry>,
    pub client: ProxyClient,
}

impl ProxyState {
    pub fn new(registry: DownstreamRegistry) -> Result<Self, rustls::Error> {
        Ok(Self {
            registry: Arc::new(registry),
            client: build_client()?,
        })
    }
}

/// Split `/{service}/{rest}` into its raw parts; both keep their encoding.
///
/// `rest` starts at the slash that follows the service segment.
pub fn split_service_path(path: &str) -> (&str, &str) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    match trimmed.find('/') {
        Some(at) => trimmed.split_at(at),
        None => (trimmed, ""),
    }
}

/// `Content-*`, `Expires`, `Last-Modified` and `Allow` describe a body.
pub fn is_content_header(name: &HeaderName) -> bool {
    let name = name.as_str();
    name.starts_with("content-") || matches!(name, "expires" | "last-modified" | "allow")
}

/// Methods whose inbound body is forwarded.
pub fn forwards_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Copy inbound headers for the outbound request.
///
/// Every value of a repeated header is kept in order. Without a forwarded
/// body, content headers ride on an empty placeholder body.
pub fn outbound_headers(inbound: &HeaderMap, with_body: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if name == header::HOST || (!with_body && name == header::CONTENT_LENGTH) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if !with_body && headers.keys().any(is_content_header) {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    }
    headers
}

/// Copy a downstream response back to the caller.
pub fn relay_response<B>(response: axum::http::Response<B>) -> Response
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    let (mut parts, body) = response.into_parts();
    parts.headers.remove(header::TRANSFER_ENCODING);
    if !parts.headers.contains_key(header::CONTENT_TYPE) {
        parts
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
    }
    Response::from_parts(parts, Body::new(body))
}

/// Forward one request to its downstream service.
///
/// The service name is the decoded `{service}` segment; the remaining path
/// is forwarded still encoded.
pub async fn forward(
    State(state): State<ProxyState>,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    request: Request,
) -> Result<Response, ProxyError> {
    let start = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let (raw_service, path) = split_service_path(parts.uri.path());
    let decoded = params.ok().and_then(|Path(mut params)| params.remove("service"));
    let service = decoded.as_deref().unwrap_or(raw_service);

    let Some(route) = state.registry.resolve(service) else {
        tracing::warn!(service = %service, "Unknown service requested");
        metrics::record_request(method.as_str(), StatusCode::NOT_FOUND.as_u16(), "unknown", start);
        return Err(ProxyError::UnknownService(service.to_string()));
    };

    let target = route.target_url(path, parts.uri.query());
    let uri: Uri = target
        .parse()
        .map_err(|_| ProxyError::InvalidTarget(target.clone()))?;

    let with_body = forwards_body(&method);
    let mut builder = axum::http::Request::builder().method(method.clone()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        *headers = outbound_headers(&parts.headers, with_body);
        if let Some(id) = parts.extensions.get::<CorrelationId>() {
            id.apply(headers);
        }
    }
    let outbound = builder
        .body(if with_body { body } else { Body::empty() })
        .map_err(|e| ProxyError::InvalidTarget(e.to_string()))?;

    tracing::info!(service = %service, method = %method, path = %path, "Proxying request");

    let result: Result<Downstream, _> = state.client.request(outbound).await;
    match result {
        Ok(response) => {
            let status = response.status();
            tracing::info!(
                service = %service,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Proxy call completed"
            );
            metrics::record_request(method.as_str(), status.as_u16(), service, start);
            Ok(relay_response(response))
        }
        Err(e) => {
            tracing::error!(
                service = %service,
                error = %e,
                duration_ms = start.elapsed().as_millis() as u64,
                "Proxy call failed"
            );
            metrics::record_request(method.as_str(), StatusCode::INTERNAL_SERVER_ERROR.as_u16(), service, start);
            Err(ProxyError::Transport(e))
        }
    }
}
