//! Metadata enrichment.
//!
//! Provider values fill the showtime's movie before it is stored. A value the
//! provider omits never erases one already present.

use chrono::{DateTime, NaiveDate};

use crate::imdb::{ImdbError, MetadataProvider, MetadataRecord};
use crate::showtimes::model::Movie;

/// Null-coalescing merge of `record` into `movie`.
pub fn merge_metadata(movie: &mut Movie, record: &MetadataRecord) {
    if let Some(title) = &record.title {
        movie.title = Some(title.clone());
    }
    if let Some(stars) = &record.stars {
        movie.stars = Some(stars.clone());
    }
    if let Some(date) = record.release_date.as_deref().and_then(parse_release_date) {
        movie.release_date = Some(date);
    }
}

/// Accepts `YYYY-MM-DD` or RFC 3339; anything else is `None`.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Fetch metadata for `movie` and merge it.
///
/// Only `ImdbError::Rejected` is returned; every other provider failure is
/// logged and the movie is left as submitted.
pub async fn enrich(
    provider: &dyn MetadataProvider,
    movie: &mut Movie,
    imdb_id: &str,
    api_key: &str,
) -> Result<(), ImdbError> {
    match provider.fetch_by_id(imdb_id, api_key).await {
        Ok(record) => {
            merge_metadata(movie, &record);
            Ok(())
        }
        Err(e @ ImdbError::Rejected { .. }) => Err(e),
        Err(e) => {
            tracing::warn!(imdb_id = %imdb_id, error = %e, "Enrichment skipped, storing showtime as submitted");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::StatusCode;

    struct Fixed(fn() -> Result<MetadataRecord, ImdbError>);

    #[async_trait]
    impl MetadataProvider for Fixed {
        async fn ping(&self) -> bool {
            true
        }

        async fn fetch_by_id(&self, _: &str, _: &str) -> Result<MetadataRecord, ImdbError> {
            (self.0)()
        }
    }

    fn existing() -> Movie {
        Movie {
            title: Some("Old".into()),
            imdb_id: Some("tt1".into()),
            stars: Some("Someone".into()),
            release_date: NaiveDate::from_ymd_opt(1999, 3, 31),
        }
    }

    #[test]
    fn test_merge_never_erases() {
        let mut movie = existing();
        merge_metadata(
            &mut movie,
            &MetadataRecord {
                title: Some("The Matrix".into()),
                ..MetadataRecord::default()
            },
        );
        assert_eq!(movie.title.as_deref(), Some("The Matrix"));
        assert_eq!(movie.stars.as_deref(), Some("Someone"));
        assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(1999, 3, 31));
    }

    #[test]
    fn test_unparseable_date_is_ignored() {
        let mut movie = existing();
        merge_metadata(
            &mut movie,
            &MetadataRecord {
                release_date: Some("31 March 1999".into()),
                ..MetadataRecord::default()
            },
        );
        assert_eq!(movie.release_date, NaiveDate::from_ymd_opt(1999, 3, 31));
    }

    #[test]
    fn test_release_date_formats() {
        assert_eq!(parse_release_date("2010-07-16"), NaiveDate::from_ymd_opt(2010, 7, 16));
        assert_eq!(
            parse_release_date("2010-07-16T00:00:00Z"),
            NaiveDate::from_ymd_opt(2010, 7, 16)
        );
        assert_eq!(parse_release_date("16/07/2010"), None);
        assert_eq!(parse_release_date(""), None);
    }

    #[tokio::test]
    async fn test_unavailable_degrades() {
        let provider = Fixed(|| Err(ImdbError::Unavailable { attempts: 4, reason: "503".into() }));
        let mut movie = existing();
        enrich(&provider, &mut movie, "tt1", "key").await.unwrap();
        assert_eq!(movie, existing());
    }

    #[tokio::test]
    async fn test_rejected_propagates() {
        let provider = Fixed(|| Err(ImdbError::Rejected { status: StatusCode::UNAUTHORIZED }));
        let mut movie = existing();
        let err = enrich(&provider, &mut movie, "tt1", "bad").await.unwrap_err();
        assert!(matches!(err, ImdbError::Rejected { status } if status == StatusCode::UNAUTHORIZED));
    }
}
