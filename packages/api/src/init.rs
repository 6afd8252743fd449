//! Server initialization for the rating service.

use std::sync::Arc;
use std::time::Duration;

use actors::{SentimentJobProcessor, start_enrichment_queue};
use db::repositories::SubjectRepository;
use db::{BudgetConfig, DbConfig, SentimentStore, SurrealSentimentStore};
use dioxus::prelude::ServerFnError;
use provider::{ProviderConfig, SearchApiProvider};
use rating_core::{QueueConfig, Subject, SubjectId, SubjectKind};
use service::{RatingService, RatingServiceConfig};
use tokio::sync::OnceCell;

static SERVICE: OnceCell<RatingService> = OnceCell::const_new();

/// Settings read from the environment.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub budget: BudgetConfig,
    pub provider: ProviderConfig,
    pub queue: QueueConfig,
    pub service: RatingServiceConfig,
}

impl ServerConfig {
    /// Build the configuration from environment variables.
    ///
    /// - `SENTIMENT_API_KEY`: provider key; unset leaves the provider unconfigured
    /// - `SENTIMENT_API_BASE_URL`: provider base URL
    /// - `SENTIMENT_COST_PER_SEARCH`: cost recorded per call
    /// - `SENTIMENT_MONTHLY_CALL_CAP`: provider calls allowed per 30 days
    /// - `RATING_DB_PATH`: file-backed database path; ignored with a warning
    ///   unless built with the `rocksdb` feature, in-memory when unset
    /// - `ENRICHMENT_PACING_MS`: pause between provider calls
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("SENTIMENT_API_KEY") {
            config.provider = config.provider.with_api_key(key);
        }
        if let Ok(url) = std::env::var("SENTIMENT_API_BASE_URL") {
            config.provider = config.provider.with_base_url(url);
        }
        if let Some(cost) = parse_env::<f64>("SENTIMENT_COST_PER_SEARCH") {
            config.provider = config.provider.with_cost_per_search(cost);
        }
        if let Some(cap) = parse_env::<u64>("SENTIMENT_MONTHLY_CALL_CAP") {
            config.budget = BudgetConfig::monthly(cap);
        }
        config.db = db_config(std::env::var("RATING_DB_PATH").ok());
        if let Some(pacing) = parse_env::<u64>("ENRICHMENT_PACING_MS") {
            config.queue = config.queue.with_pacing(Duration::from_millis(pacing));
        }

        config
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}

/// Database settings for an optional `RATING_DB_PATH`.
#[cfg(feature = "rocksdb")]
fn db_config(path: Option<String>) -> DbConfig {
    path.map(DbConfig::file).unwrap_or_default()
}

/// Without the RocksDB engine a `file://` endpoint cannot open, so the path
/// is dropped in favour of the in-memory store.
#[cfg(not(feature = "rocksdb"))]
fn db_config(path: Option<String>) -> DbConfig {
    if let Some(path) = path {
        tracing::warn!(
            "RATING_DB_PATH={:?} ignored without the `rocksdb` feature; using in-memory storage",
            path
        );
    }
    DbConfig::memory()
}

async fn build_service(
    config: ServerConfig,
) -> Result<RatingService, Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!("Initializing rating service...");

    let db = db::init(&config.db).await?;
    let store = Arc::new(SurrealSentimentStore::new(db).with_budget(config.budget));
    seed_demo_catalog(&store).await?;

    if !config.provider.is_configured() {
        tracing::warn!("SENTIMENT_API_KEY not set; enrichment jobs will be skipped");
    }
    let provider = Arc::new(SearchApiProvider::new(config.provider)?);

    let processor = Arc::new(SentimentJobProcessor::new(provider, store.clone()));
    let (queue, _handle) = start_enrichment_queue(config.queue, processor).await?;

    tracing::info!("Rating service initialized");
    Ok(RatingService::new(store, queue).with_config(config.service))
}

/// Seed a few subjects when the catalog is empty so the UI has something to rate.
async fn seed_demo_catalog(store: &SurrealSentimentStore) -> Result<(), db::DbError> {
    if !SubjectRepository::list(store.database()).await?.is_empty() {
        return Ok(());
    }

    tracing::info!("Seeding demo catalog...");
    let demo = [
        ("heat-1995", "Heat", SubjectKind::Movie, 1995),
        ("alien-1979", "Alien", SubjectKind::Movie, 1979),
        ("the-wire", "The Wire", SubjectKind::Series, 2002),
    ];
    for (id, title, kind, year) in demo {
        let id = SubjectId::parse(id).map_err(|e| db::DbError::Query(e.to_string()))?;
        store
            .upsert_subject(&Subject::new(id, title, kind).with_release_year(year))
            .await?;
    }
    Ok(())
}

/// The process-wide rating service, built on first use.
pub async fn rating_service() -> Result<&'static RatingService, ServerFnError> {
    SERVICE
        .get_or_try_init(|| build_service(ServerConfig::from_env()))
        .await
        .map_err(|e| ServerFnError::new(format!("Rating service unavailable: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_db_path_uses_memory() {
        assert_eq!(db_config(None).endpoint, "mem://");
    }

    #[cfg(not(feature = "rocksdb"))]
    #[test]
    fn db_path_without_rocksdb_falls_back_to_memory() {
        let config = db_config(Some("/var/lib/ratings".to_string()));
        assert_eq!(config.endpoint, "mem://");
    }

    #[cfg(feature = "rocksdb")]
    #[test]
    fn db_path_with_rocksdb_opens_file() {
        let config = db_config(Some("/var/lib/ratings".to_string()));
        assert_eq!(config.endpoint, "file:///var/lib/ratings");
    }
}
