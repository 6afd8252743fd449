//! SurrealDB integration for the sentiment enrichment pipeline.
//!
//! This crate provides database connectivity, repositories for catalog
//! subjects, sentiment records and provider calls, and the
//! [`SentimentStore`] seam the queue and orchestrator talk to.
//!
//! # Features
//!
//! - `memory` (default): Use in-memory storage for testing
//! - `rocksdb`: Use RocksDB for persistent file-based storage

mod connection;
mod schema;
mod store;
pub mod repositories;

pub use connection::{Database, DbConfig, DbError, connect};
pub use schema::init_schema;
pub use store::{BudgetConfig, SentimentStore, StoreFuture, SurrealSentimentStore};

/// Connect and initialize the schema.
///
/// Call once at application startup and share the returned handle.
pub async fn init(config: &DbConfig) -> Result<Database, DbError> {
    let db = connect(config).await?;
    init_schema(&db).await?;
    Ok(db)
}
