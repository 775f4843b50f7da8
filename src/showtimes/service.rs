//! Showtime use cases.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::imdb::{ImdbError, MetadataProvider};
use crate::showtimes::enrichment::enrich;
use crate::showtimes::model::Showtime;
use crate::showtimes::repository::{RepositoryError, ShowtimesRepository};

#[derive(Debug, Error)]
pub enum ShowtimesError {
    #[error("movie.imdb_id required")]
    MissingImdbId,

    #[error("imdbApiKey required")]
    MissingApiKey,

    #[error(transparent)]
    NotFound(#[from] RepositoryError),

    /// The provider refused the lookup (bad key, unknown id).
    #[error("metadata lookup rejected: {0}")]
    Rejected(#[source] ImdbError),
}

/// Showtime CRUD with metadata enrichment on write.
#[derive(Clone)]
pub struct ShowtimesService {
    repository: Arc<dyn ShowtimesRepository>,
    provider: Arc<dyn MetadataProvider>,
}

impl ShowtimesService {
    pub fn new(repository: Arc<dyn ShowtimesRepository>, provider: Arc<dyn MetadataProvider>) -> Self {
        Self { repository, provider }
    }

    /// Showtimes running on `date` whose title contains `title`.
    ///
    /// A blank title term applies no title filter.
    pub fn list(&self, date: Option<NaiveDate>, title: Option<&str>) -> Vec<Showtime> {
        let term = title.map(str::trim).filter(|t| !t.is_empty());
        if date.is_none() && term.is_none() {
            return self.repository.get_collection(None);
        }

        let filter = |s: &Showtime| {
            date.is_none_or(|d| s.runs_on(d)) && term.is_none_or(|t| s.title_contains(t))
        };
        self.repository.get_collection(Some(&filter))
    }

    /// Enrich then store a new showtime.
    pub async fn create(&self, mut showtime: Showtime, api_key: Option<&str>) -> Result<Showtime, ShowtimesError> {
        let imdb_id = showtime.imdb_id().ok_or(ShowtimesError::MissingImdbId)?.to_string();
        let api_key = non_blank(api_key).ok_or(ShowtimesError::MissingApiKey)?;

        if let Some(movie) = showtime.movie.as_mut() {
            enrich(self.provider.as_ref(), movie, &imdb_id, api_key)
                .await
                .map_err(ShowtimesError::Rejected)?;
        }

        let created = self.repository.add(showtime);
        tracing::info!(showtime_id = created.id, imdb_id = %imdb_id, "Showtime created");
        Ok(created)
    }

    /// Update an existing showtime, enriching only when an IMDB id and key are both given.
    pub async fn update(&self, mut showtime: Showtime, api_key: Option<&str>) -> Result<Showtime, ShowtimesError> {
        let imdb_id = showtime.imdb_id().map(str::to_string);
        if let (Some(imdb_id), Some(api_key), Some(movie)) =
            (imdb_id, non_blank(api_key), showtime.movie.as_mut())
        {
            enrich(self.provider.as_ref(), movie, &imdb_id, api_key)
                .await
                .map_err(ShowtimesError::Rejected)?;
        }

        let updated = self.repository.update(showtime)?;
        tracing::info!(showtime_id = updated.id, "Showtime updated");
        Ok(updated)
    }

    pub fn delete(&self, id: i64) -> Result<Showtime, ShowtimesError> {
        let removed = self.repository.delete(id)?;
        tracing::info!(showtime_id = id, "Showtime deleted");
        Ok(removed)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
