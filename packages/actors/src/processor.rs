//! Job processor trait and the sentiment processor.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use db::SentimentStore;
use provider::{ProviderError, SentimentProvider};
use rating_core::{EnrichmentJob, JobOutcome, ProviderCall};

/// Future type for job processing.
pub type ProcessFuture<'a> = Pin<Box<dyn Future<Output = JobOutcome> + Send + 'a>>;

/// Trait for job processors.
///
/// A processor runs one attempt of a job and reports what happened. It never
/// fails: every error becomes a [`JobOutcome`].
pub trait JobProcessor: Send + Sync + 'static {
    fn process<'a>(&'a self, job: &'a EnrichmentJob) -> ProcessFuture<'a>;
}

/// A simple function-based job processor.
pub struct FnProcessor<F>
where
    F: Fn(&EnrichmentJob) -> ProcessFuture<'static> + Send + Sync + 'static,
{
    processor: F,
}

impl<F> FnProcessor<F>
where
    F: Fn(&EnrichmentJob) -> ProcessFuture<'static> + Send + Sync + 'static,
{
    pub fn new(processor: F) -> Self {
        Self { processor }
    }
}

impl<F> JobProcessor for FnProcessor<F>
where
    F: Fn(&EnrichmentJob) -> ProcessFuture<'static> + Send + Sync + 'static,
{
    fn process<'a>(&'a self, job: &'a EnrichmentJob) -> ProcessFuture<'a> {
        (self.processor)(job)
    }
}

/// Fetches a percentage from the provider and persists it.
pub struct SentimentJobProcessor {
    provider: Arc<dyn SentimentProvider>,
    store: Arc<dyn SentimentStore>,
}

impl SentimentJobProcessor {
    pub fn new(provider: Arc<dyn SentimentProvider>, store: Arc<dyn SentimentStore>) -> Self {
        Self { provider, store }
    }

    async fn run(&self, job: &EnrichmentJob) -> JobOutcome {
        let subject_id = &job.subject_id;

        match self.store.get_sentiment(subject_id).await {
            Ok(Some(record)) => {
                if let Some(percentage) = record.percentage {
                    tracing::debug!("Sentiment for {} already stored", subject_id);
                    return JobOutcome::AlreadyPresent { percentage };
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to read sentiment for {}: {}", subject_id, e);
                return JobOutcome::Failed {
                    error: e.to_string(),
                };
            }
        }

        let query = job.provider_query();
        let started = Instant::now();
        let fetched = self.provider.fetch_sentiment(&query).await;

        let (outcome, cost, latency_ms) = match fetched {
            Err(ProviderError::NotConfigured) => {
                tracing::info!(
                    "Provider {} not configured; skipping {}",
                    self.provider.name(),
                    subject_id
                );
                return JobOutcome::Skipped;
            }
            Err(e) => {
                tracing::warn!("Provider call for {:?} failed: {}", query, e);
                let latency_ms = started.elapsed().as_millis() as u64;
                (
                    JobOutcome::Failed {
                        error: e.to_string(),
                    },
                    0.0,
                    latency_ms,
                )
            }
            Ok(fetch) => {
                let outcome = match fetch.percentage {
                    Some(percentage) => self.store_percentage(job, percentage).await,
                    None => {
                        if let Err(e) = self.store.mark_searched(subject_id).await {
                            tracing::warn!("Failed to mark {} searched: {}", subject_id, e);
                        }
                        JobOutcome::NoData
                    }
                };
                (outcome, fetch.cost, fetch.latency_ms)
            }
        };

        let call = ProviderCall {
            subject_id: subject_id.clone(),
            query,
            cost,
            latency_ms,
            outcome: outcome.as_str().to_string(),
        };
        if let Err(e) = self.store.record_provider_call(&call).await {
            tracing::warn!("Failed to record provider call for {}: {}", subject_id, e);
        }

        outcome
    }

    async fn store_percentage(&self, job: &EnrichmentJob, percentage: u8) -> JobOutcome {
        match self.store.set_sentiment(&job.subject_id, percentage).await {
            Ok(record) => JobOutcome::Stored {
                percentage: record.percentage.unwrap_or(percentage),
            },
            Err(e) => {
                tracing::error!("Failed to store sentiment for {}: {}", job.subject_id, e);
                JobOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

impl JobProcessor for SentimentJobProcessor {
    fn process<'a>(&'a self, job: &'a EnrichmentJob) -> ProcessFuture<'a> {
        Box::pin(self.run(job))
    }
}
