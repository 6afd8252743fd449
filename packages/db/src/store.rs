//! Sentiment store trait and its SurrealDB implementation.

use std::future::Future;
use std::pin::Pin;

use rating_core::{ProviderCall, SentimentRecord, Subject, SubjectId};

use crate::repositories::{ProviderCallRepository, SentimentRepository, SubjectRepository};
use crate::{Database, DbError};

/// Future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DbError>> + Send + 'a>>;

/// Persistence seam used by the enrichment queue and the rating service.
pub trait SentimentStore: Send + Sync + 'static {
    /// Look up a catalog subject.
    fn get_subject<'a>(&'a self, id: &'a SubjectId) -> StoreFuture<'a, Option<Subject>>;

    /// Insert or update a catalog subject.
    fn upsert_subject<'a>(&'a self, subject: &'a Subject) -> StoreFuture<'a, Subject>;

    /// Read the sentiment record for a subject.
    fn get_sentiment<'a>(&'a self, id: &'a SubjectId)
    -> StoreFuture<'a, Option<SentimentRecord>>;

    /// Store a percentage. An existing percentage is kept.
    fn set_sentiment<'a>(
        &'a self,
        id: &'a SubjectId,
        percentage: u8,
    ) -> StoreFuture<'a, SentimentRecord>;

    /// Count a search that produced no percentage.
    fn mark_searched<'a>(&'a self, id: &'a SubjectId) -> StoreFuture<'a, SentimentRecord>;

    /// Append a provider round trip to the call log.
    fn record_provider_call<'a>(&'a self, call: &'a ProviderCall) -> StoreFuture<'a, ()>;

    /// Whether the rolling call budget is spent.
    fn is_request_budget_exhausted(&self) -> StoreFuture<'_, bool>;
}

/// Request budget over a rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetConfig {
    /// Maximum provider calls per window. `None` disables the budget.
    pub max_calls: Option<u64>,
    pub window_days: u32,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_calls: None,
            window_days: 30,
        }
    }
}

impl BudgetConfig {
    /// A budget of `max_calls` per 30 days.
    pub fn monthly(max_calls: u64) -> Self {
        Self {
            max_calls: Some(max_calls),
            ..Default::default()
        }
    }
}

/// [`SentimentStore`] backed by SurrealDB.
#[derive(Clone)]
pub struct SurrealSentimentStore {
    db: Database,
    budget: BudgetConfig,
}

impl SurrealSentimentStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            budget: BudgetConfig::default(),
        }
    }

    pub fn with_budget(mut self, budget: BudgetConfig) -> Self {
        self.budget = budget;
        self
    }

    pub fn budget(&self) -> BudgetConfig {
        self.budget
    }

    /// Underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl SentimentStore for SurrealSentimentStore {
    fn get_subject<'a>(&'a self, id: &'a SubjectId) -> StoreFuture<'a, Option<Subject>> {
        Box::pin(SubjectRepository::get(&self.db, id))
    }

    fn upsert_subject<'a>(&'a self, subject: &'a Subject) -> StoreFuture<'a, Subject> {
        Box::pin(SubjectRepository::upsert(&self.db, subject))
    }

    fn get_sentiment<'a>(
        &'a self,
        id: &'a SubjectId,
    ) -> StoreFuture<'a, Option<SentimentRecord>> {
        Box::pin(SentimentRepository::get(&self.db, id))
    }

    fn set_sentiment<'a>(
        &'a self,
        id: &'a SubjectId,
        percentage: u8,
    ) -> StoreFuture<'a, SentimentRecord> {
        Box::pin(SentimentRepository::set_percentage(&self.db, id, percentage))
    }

    fn mark_searched<'a>(&'a self, id: &'a SubjectId) -> StoreFuture<'a, SentimentRecord> {
        Box::pin(SentimentRepository::mark_searched(&self.db, id))
    }

    fn record_provider_call<'a>(&'a self, call: &'a ProviderCall) -> StoreFuture<'a, ()> {
        Box::pin(ProviderCallRepository::record(&self.db, call))
    }

    fn is_request_budget_exhausted(&self) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let Some(max_calls) = self.budget.max_calls else {
                return Ok(false);
            };

            let usage =
                ProviderCallRepository::usage_since(&self.db, self.budget.window_days).await?;
            if usage.calls >= max_calls {
                tracing::warn!(
                    "Request budget exhausted: {} calls in the last {} days (cap {})",
                    usage.calls,
                    self.budget.window_days,
                    max_calls
                );
                return Ok(true);
            }
            Ok(false)
        })
    }
}
