//! Showtime persistence.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use thiserror::Error;

use crate::showtimes::model::Showtime;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("showtime {0} not found")]
    NotFound(i64),
}

/// Key-indexed showtime store.
pub trait ShowtimesRepository: Send + Sync {
    /// All showtimes matching `filter`, ordered by id.
    fn get_collection(&self, filter: Option<&dyn Fn(&Showtime) -> bool>) -> Vec<Showtime>;

    /// Insert and return the stored entity with its new id.
    fn add(&self, showtime: Showtime) -> Showtime;

    /// Replace an existing entity. A `None` movie keeps the stored one.
    fn update(&self, showtime: Showtime) -> Result<Showtime, RepositoryError>;

    fn delete(&self, id: i64) -> Result<Showtime, RepositoryError>;
}

/// In-process store.
#[derive(Debug)]
pub struct InMemoryShowtimes {
    entries: DashMap<i64, Showtime>,
    next_id: AtomicI64,
}

impl InMemoryShowtimes {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryShowtimes {
    fn default() -> Self {
        Self::new()
    }
}

impl ShowtimesRepository for InMemoryShowtimes {
    fn get_collection(&self, filter: Option<&dyn Fn(&Showtime) -> bool>) -> Vec<Showtime> {
        let mut items: Vec<Showtime> = self
            .entries
            .iter()
            .filter(|entry| filter.is_none_or(|f| f(entry.value())))
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|s| s.id);
        items
    }

    fn add(&self, mut showtime: Showtime) -> Showtime {
        showtime.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(showtime.id, showtime.clone());
        showtime
    }

    fn update(&self, showtime: Showtime) -> Result<Showtime, RepositoryError> {
        let mut existing = self
            .entries
            .get_mut(&showtime.id)
            .ok_or(RepositoryError::NotFound(showtime.id))?;

        existing.start_date = showtime.start_date;
        existing.end_date = showtime.end_date;
        existing.schedule = showtime.schedule;
        existing.auditorium_id = showtime.auditorium_id;
        if showtime.movie.is_some() {
            existing.movie = showtime.movie;
        }
        Ok(existing.value().clone())
    }

    fn delete(&self, id: i64) -> Result<Showtime, RepositoryError> {
        self.entries
            .remove(&id)
            .map(|(_, showtime)| showtime)
            .ok_or(RepositoryError::NotFound(id))
    }
}
