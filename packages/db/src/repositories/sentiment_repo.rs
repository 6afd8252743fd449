//! Sentiment repository.
//!
//! Records are keyed by subject id. A stored percentage is never replaced:
//! the write queries coalesce the existing value before the new one.

use chrono::{DateTime, Utc};
use rating_core::{SentimentRecord, SubjectId};
use serde::Deserialize;

use crate::{Database, DbError};

/// Repository for sentiment records.
pub struct SentimentRepository;

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
struct SentimentRow {
    subject_id: String,
    percentage: Option<u8>,
    #[serde(default)]
    search_count: u32,
    last_searched_at: Option<DateTime<Utc>>,
}

impl TryFrom<SentimentRow> for SentimentRecord {
    type Error = DbError;

    fn try_from(row: SentimentRow) -> Result<Self, Self::Error> {
        let subject_id = SubjectId::parse(&row.subject_id)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        Ok(SentimentRecord {
            subject_id,
            percentage: row.percentage,
            search_count: row.search_count,
            last_searched_at: row.last_searched_at,
        })
    }
}

const SET_PERCENTAGE: &str = r#"
UPSERT type::thing('sentiment', $id) SET
    subject_id = $id,
    percentage = percentage ?? $percentage,
    search_count = (search_count ?? 0) + 1,
    last_searched_at = time::now()
RETURN AFTER;
"#;

const MARK_SEARCHED: &str = r#"
UPSERT type::thing('sentiment', $id) SET
    subject_id = $id,
    search_count = (search_count ?? 0) + 1,
    last_searched_at = time::now()
RETURN AFTER;
"#;

impl SentimentRepository {
    /// Get the sentiment record for a subject.
    pub async fn get(db: &Database, id: &SubjectId) -> Result<Option<SentimentRecord>, DbError> {
        let row: Option<SentimentRow> = db.select(("sentiment", id.to_string())).await?;
        row.map(SentimentRecord::try_from).transpose()
    }

    /// Store a percentage unless one is already present, and count the search.
    pub async fn set_percentage(
        db: &Database,
        id: &SubjectId,
        percentage: u8,
    ) -> Result<SentimentRecord, DbError> {
        if percentage > 100 {
            return Err(DbError::Query(format!(
                "percentage out of range: {}",
                percentage
            )));
        }

        let mut result = db
            .query(SET_PERCENTAGE)
            .bind(("id", id.to_string()))
            .bind(("percentage", percentage as i64))
            .await?;

        let row: Option<SentimentRow> = result.take(0)?;
        row.map(SentimentRecord::try_from)
            .transpose()?
            .ok_or_else(|| DbError::Query("Failed to store sentiment".into()))
    }

    /// Count a search that found nothing.
    pub async fn mark_searched(
        db: &Database,
        id: &SubjectId,
    ) -> Result<SentimentRecord, DbError> {
        let mut result = db
            .query(MARK_SEARCHED)
            .bind(("id", id.to_string()))
            .await?;

        let row: Option<SentimentRow> = result.take(0)?;
        row.map(SentimentRecord::try_from)
            .transpose()?
            .ok_or_else(|| DbError::Query("Failed to mark subject searched".into()))
    }
}
