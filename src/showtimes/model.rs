//! Showtime entities.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A scheduled run of one movie in one auditorium.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Showtime {
    /// Assigned by the repository on insert.
    pub id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedule: Vec<String>,
    pub auditorium_id: i64,
    pub movie: Option<Movie>,
}

impl Showtime {
    /// Whether `date` falls inside the showtime's run, bounds included.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Case-insensitive substring match on the movie title.
    pub fn title_contains(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.movie
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .is_some_and(|title| title.to_lowercase().contains(&needle))
    }

    pub fn imdb_id(&self) -> Option<&str> {
        self.movie
            .as_ref()
            .and_then(|m| m.imdb_id.as_deref())
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    pub title: Option<String>,
    pub imdb_id: Option<String>,
    pub stars: Option<String>,
    pub release_date: Option<NaiveDate>,
}
