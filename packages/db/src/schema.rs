//! Database schema definitions using SurrealQL.

use crate::{Database, DbError};

/// Initialize the database schema.
///
/// This creates all necessary tables, fields, and indexes.
pub async fn init_schema(db: &Database) -> Result<(), DbError> {
    tracing::info!("Initializing database schema...");

    // Catalog subjects
    db.query(SUBJECT_SCHEMA).await?;

    // Sentiment records, keyed by subject id
    db.query(SENTIMENT_SCHEMA).await?;

    // Provider call log (for budgeting)
    db.query(PROVIDER_CALL_SCHEMA).await?;

    tracing::info!("Database schema initialized");

    Ok(())
}

/// Subject table schema.
const SUBJECT_SCHEMA: &str = r#"
-- Catalog entries that can be enriched
DEFINE TABLE IF NOT EXISTS subject SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS title ON subject TYPE string;
DEFINE FIELD IF NOT EXISTS kind ON subject TYPE string DEFAULT "movie";
DEFINE FIELD IF NOT EXISTS release_year ON subject TYPE option<int>;
DEFINE FIELD IF NOT EXISTS created_at ON subject TYPE datetime DEFAULT time::now();

DEFINE INDEX IF NOT EXISTS subject_kind ON subject FIELDS kind;
"#;

/// Sentiment table schema.
const SENTIMENT_SCHEMA: &str = r#"
-- One record per subject; percentage is write-once
DEFINE TABLE IF NOT EXISTS sentiment SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS subject_id ON sentiment TYPE string;
DEFINE FIELD IF NOT EXISTS percentage ON sentiment TYPE option<int> ASSERT $value = NONE OR ($value >= 0 AND $value <= 100);
DEFINE FIELD IF NOT EXISTS search_count ON sentiment TYPE int DEFAULT 0;
DEFINE FIELD IF NOT EXISTS last_searched_at ON sentiment TYPE option<datetime>;

DEFINE INDEX IF NOT EXISTS sentiment_subject ON sentiment FIELDS subject_id UNIQUE;
"#;

/// Provider call table schema.
const PROVIDER_CALL_SCHEMA: &str = r#"
-- Every round trip to the sentiment provider
DEFINE TABLE IF NOT EXISTS provider_call SCHEMAFULL;

DEFINE FIELD IF NOT EXISTS subject_id ON provider_call TYPE string;
DEFINE FIELD IF NOT EXISTS search_query ON provider_call TYPE string;
DEFINE FIELD IF NOT EXISTS cost ON provider_call TYPE float DEFAULT 0.0;
DEFINE FIELD IF NOT EXISTS latency_ms ON provider_call TYPE int DEFAULT 0;
DEFINE FIELD IF NOT EXISTS outcome ON provider_call TYPE string;
DEFINE FIELD IF NOT EXISTS called_at ON provider_call TYPE datetime DEFAULT time::now();

-- Indexes for the rolling budget window
DEFINE INDEX IF NOT EXISTS provider_call_called ON provider_call FIELDS called_at;
DEFINE INDEX IF NOT EXISTS provider_call_subject ON provider_call FIELDS subject_id;
"#;
