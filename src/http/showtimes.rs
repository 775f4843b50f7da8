//! Showtimes API handlers.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::health::{ImdbStatusReader, StatusSnapshot};
use crate::http::error::ProblemDetails;
use crate::http::movies::imdb_problem;
use crate::imdb::ImdbError;
use crate::showtimes::{Showtime, ShowtimesError, ShowtimesService};

#[derive(Clone)]
pub struct ShowtimesState {
    pub service: ShowtimesService,
    pub status: ImdbStatusReader,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiKeyQuery {
    #[serde(rename = "imdbApiKey")]
    pub imdb_api_key: Option<String>,
}

pub fn routes(state: ShowtimesState) -> Router {
    Router::new()
        .route("/showtime", get(list).post(create).put(update))
        .route("/showtime/{id}", delete(remove))
        .route("/status", get(status))
        .with_state(state)
}

impl IntoResponse for ShowtimesError {
    fn into_response(self) -> Response {
        match &self {
            ShowtimesError::MissingImdbId | ShowtimesError::MissingApiKey => {
                ProblemDetails::new(StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            ShowtimesError::NotFound(_) => {
                ProblemDetails::new(StatusCode::NOT_FOUND, self.to_string()).into_response()
            }
            ShowtimesError::Rejected(ImdbError::Rejected { .. }) => {
                ProblemDetails::new(StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            ShowtimesError::Rejected(inner) => imdb_problem(inner).into_response(),
        }
    }
}

fn bad_request(detail: impl Into<String>) -> ProblemDetails {
    ProblemDetails::new(StatusCode::BAD_REQUEST, detail)
}

async fn list(
    State(state): State<ShowtimesState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Showtime>>, ProblemDetails> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;
    Ok(Json(state.service.list(query.date, query.title.as_deref())))
}

async fn create(
    State(state): State<ShowtimesState>,
    Query(key): Query<ApiKeyQuery>,
    payload: Result<Json<Showtime>, JsonRejection>,
) -> Result<Response, Response> {
    let Json(showtime) = payload.map_err(|e| bad_request(e.body_text()).into_response())?;
    let created = state
        .service
        .create(showtime, key.imdb_api_key.as_deref())
        .await
        .map_err(IntoResponse::into_response)?;

    let location = format!("/showtime/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

async fn update(
    State(state): State<ShowtimesState>,
    Query(key): Query<ApiKeyQuery>,
    payload: Result<Json<Showtime>, JsonRejection>,
) -> Result<Json<Showtime>, Response> {
    let Json(showtime) = payload.map_err(|e| bad_request(e.body_text()).into_response())?;
    let updated = state
        .service
        .update(showtime, key.imdb_api_key.as_deref())
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(Json(updated))
}

async fn remove(State(state): State<ShowtimesState>, Path(id): Path<i64>) -> Result<StatusCode, ShowtimesError> {
    state.service.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn status(State(state): State<ShowtimesState>) -> Json<StatusSnapshot> {
    Json(state.status.snapshot())
}
