//! Movies API handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::http::error::ProblemDetails;
use crate::imdb::{ImdbError, MetadataProvider, MetadataRecord};

#[derive(Clone)]
pub struct MoviesState {
    pub provider: Arc<dyn MetadataProvider>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PingResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

pub fn routes(provider: Arc<dyn MetadataProvider>) -> Router {
    Router::new()
        .route("/movies/ping", get(ping))
        .route("/movies/{imdb_id}", get(get_by_id))
        .with_state(MoviesState { provider })
}

async fn ping(State(state): State<MoviesState>) -> Json<PingResponse> {
    let up = state.provider.ping().await;
    Json(PingResponse {
        status: if up { "ok" } else { "fail" }.to_string(),
    })
}

async fn get_by_id(
    State(state): State<MoviesState>,
    Path(imdb_id): Path<String>,
    Query(query): Query<TitleQuery>,
) -> Result<Json<MetadataRecord>, ProblemDetails> {
    let api_key = query
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ProblemDetails::new(StatusCode::BAD_REQUEST, "apiKey required"))?;

    let record = state
        .provider
        .fetch_by_id(&imdb_id, api_key)
        .await
        .map_err(|e| imdb_problem(&e))?;
    Ok(Json(record))
}

/// Map a provider failure to the caller-facing problem.
pub fn imdb_problem(error: &ImdbError) -> ProblemDetails {
    let status = match error {
        ImdbError::Rejected { status } if status.is_client_error() => *status,
        ImdbError::Rejected { .. } => StatusCode::BAD_REQUEST,
        ImdbError::Unavailable { .. } | ImdbError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ImdbError::Decode(_) => StatusCode::BAD_GATEWAY,
        ImdbError::Config(_) | ImdbError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ProblemDetails::new(status, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct Stub {
        up: bool,
        result: fn(&str) -> Result<MetadataRecord, ImdbError>,
    }

    #[async_trait]
    impl MetadataProvider for Stub {
        async fn ping(&self) -> bool {
            self.up
        }

        async fn fetch_by_id(&self, imdb_id: &str, _: &str) -> Result<MetadataRecord, ImdbError> {
            (self.result)(imdb_id)
        }
    }

    fn app(up: bool, result: fn(&str) -> Result<MetadataRecord, ImdbError>) -> Router {
        routes(Arc::new(Stub { up, result }))
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    fn found(id: &str) -> Result<MetadataRecord, ImdbError> {
        Ok(MetadataRecord {
            title: Some("Heat".into()),
            id: Some(id.into()),
            ..MetadataRecord::default()
        })
    }

    #[tokio::test]
    async fn test_ping_reports_status() {
        let (status, body) = call(app(true, found), "/movies/ping").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (_, body) = call(app(false, found), "/movies/ping").await;
        assert_eq!(body["status"], "fail");
    }

    #[tokio::test]
    async fn test_lookup_returns_record() {
        let (status, body) = call(app(true, found), "/movies/tt0113277?apiKey=k").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Heat");
        assert_eq!(body["id"], "tt0113277");
    }

    #[tokio::test]
    async fn test_missing_key_is_bad_request() {
        let (status, body) = call(app(true, found), "/movies/tt1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_provider_errors_map_to_status() {
        let rejected = |_: &str| -> Result<MetadataRecord, ImdbError> {
            Err(ImdbError::Rejected { status: StatusCode::NOT_FOUND })
        };
        let (status, _) = call(app(true, rejected), "/movies/tt1?apiKey=k").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let down = |_: &str| -> Result<MetadataRecord, ImdbError> {
            Err(ImdbError::Unavailable { attempts: 4, reason: "503".into() })
        };
        let (status, body) = call(app(true, down), "/movies/tt1?apiKey=k").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["type"], "https://httpstatuses.com/503");
    }
}
