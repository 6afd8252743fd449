//! Subject repository for catalog entries.

use rating_core::{Subject, SubjectId, SubjectKind};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::{Database, DbError};

/// Repository for catalog subjects.
pub struct SubjectRepository;

/// Internal record type for SurrealDB reads.
#[derive(Debug, Deserialize)]
struct SubjectRecord {
    id: Option<Thing>,
    title: String,
    kind: SubjectKind,
    release_year: Option<u16>,
}

impl SubjectRecord {
    fn into_subject(self, id: SubjectId) -> Subject {
        Subject {
            id,
            title: self.title,
            kind: self.kind,
            release_year: self.release_year,
        }
    }

    fn record_id(&self) -> Result<SubjectId, DbError> {
        let raw = self
            .id
            .as_ref()
            .map(|t| t.id.to_raw())
            .ok_or_else(|| DbError::Serialization("subject record without id".into()))?;
        SubjectId::parse(&raw).map_err(|e| DbError::Serialization(e.to_string()))
    }
}

/// Fields written on upsert; `created_at` is left to its default.
#[derive(Debug, Clone, Serialize)]
struct SubjectWrite {
    title: String,
    kind: SubjectKind,
    release_year: Option<u16>,
}

impl SubjectRepository {
    /// Insert or update a subject.
    pub async fn upsert(db: &Database, subject: &Subject) -> Result<Subject, DbError> {
        let data = SubjectWrite {
            title: subject.title.clone(),
            kind: subject.kind,
            release_year: subject.release_year,
        };

        let record: Option<SubjectRecord> = db
            .upsert(("subject", subject.id.to_string()))
            .merge(data)
            .await?;

        record
            .map(|r| r.into_subject(subject.id.clone()))
            .ok_or_else(|| DbError::Query("Failed to upsert subject".into()))
    }

    /// Get a subject by ID.
    pub async fn get(db: &Database, id: &SubjectId) -> Result<Option<Subject>, DbError> {
        let record: Option<SubjectRecord> = db.select(("subject", id.to_string())).await?;
        Ok(record.map(|r| r.into_subject(id.clone())))
    }

    /// List all subjects ordered by title.
    pub async fn list(db: &Database) -> Result<Vec<Subject>, DbError> {
        let mut result = db.query("SELECT * FROM subject ORDER BY title ASC").await?;
        let records: Vec<SubjectRecord> = result.take(0)?;

        records
            .into_iter()
            .map(|r| {
                let id = r.record_id()?;
                Ok(r.into_subject(id))
            })
            .collect()
    }

    /// Delete a subject.
    pub async fn delete(db: &Database, id: &SubjectId) -> Result<bool, DbError> {
        let deleted: Option<SubjectRecord> = db.delete(("subject", id.to_string())).await?;
        Ok(deleted.is_some())
    }
}
