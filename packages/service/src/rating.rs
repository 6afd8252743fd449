//! Rating read and request operations.

use std::sync::Arc;

use actors::{EnqueueWait, EnrichmentQueue};
use db::SentimentStore;
use rating_core::{
    EnrichmentJob, JobOutcome, JobResolution, QueueStatus, RatingResponse, RatingStatus,
    RequestOrigin, SubjectId,
};

use crate::{RatingServiceConfig, ServiceError};

/// Orchestrates rating lookups over the store and the enrichment queue.
#[derive(Clone)]
pub struct RatingService {
    store: Arc<dyn SentimentStore>,
    queue: EnrichmentQueue,
    config: RatingServiceConfig,
}

impl RatingService {
    pub fn new(store: Arc<dyn SentimentStore>, queue: EnrichmentQueue) -> Self {
        Self {
            store,
            queue,
            config: RatingServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RatingServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn queue(&self) -> &EnrichmentQueue {
        &self.queue
    }

    /// Current rating without side effects.
    ///
    /// Store or queue failures are reported as [`RatingStatus::Error`].
    pub async fn read(&self, subject_id: &SubjectId) -> RatingResponse {
        match self.try_read(subject_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Rating read for {} failed: {}", subject_id, e);
                RatingResponse::status(subject_id.clone(), RatingStatus::Error)
            }
        }
    }

    /// Return the rating, enqueueing enrichment when none is stored.
    ///
    /// Waits up to the configured immediate-wait window for the job, so a
    /// fast provider answers in the same round trip.
    pub async fn request(&self, subject_id: &SubjectId, origin: RequestOrigin) -> RatingResponse {
        match self.try_request(subject_id, origin).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Rating request for {} failed: {}", subject_id, e);
                RatingResponse::status(subject_id.clone(), RatingStatus::Error)
            }
        }
    }

    /// Queue snapshot for diagnostics.
    pub async fn queue_status(&self) -> Result<QueueStatus, ServiceError> {
        Ok(self.queue.status().await?)
    }

    async fn try_read(&self, subject_id: &SubjectId) -> Result<RatingResponse, ServiceError> {
        if let Some(percentage) = self.stored_percentage(subject_id).await? {
            return Ok(RatingResponse::cached(subject_id.clone(), percentage));
        }

        let status = if self.queue.contains(subject_id).await? {
            RatingStatus::Queued
        } else {
            RatingStatus::NotFound
        };
        Ok(RatingResponse::status(subject_id.clone(), status))
    }

    async fn try_request(
        &self,
        subject_id: &SubjectId,
        origin: RequestOrigin,
    ) -> Result<RatingResponse, ServiceError> {
        if let Some(percentage) = self.stored_percentage(subject_id).await? {
            return Ok(RatingResponse::cached(subject_id.clone(), percentage));
        }

        if self.store.is_request_budget_exhausted().await? {
            tracing::info!("Request for {} refused: budget exhausted", subject_id);
            return Ok(RatingResponse::status(
                subject_id.clone(),
                RatingStatus::LimitReached,
            ));
        }

        let Some(subject) = self.store.get_subject(subject_id).await? else {
            tracing::debug!("Subject {} not in catalog", subject_id);
            return Ok(RatingResponse::status(
                subject_id.clone(),
                RatingStatus::NotFound,
            ));
        };

        let job = EnrichmentJob::for_subject(&subject).with_priority(origin.priority());
        tracing::debug!(
            "Enqueueing {} ({}) for {:?} request",
            subject_id,
            job.priority,
            origin
        );

        let response = match self
            .queue
            .enqueue_and_wait(job, self.config.immediate_wait())
            .await?
        {
            EnqueueWait::Resolved(resolution) => Self::from_resolution(resolution),
            EnqueueWait::StillQueued => {
                RatingResponse::status(subject_id.clone(), RatingStatus::Queued)
            }
        };
        Ok(response)
    }

    async fn stored_percentage(&self, subject_id: &SubjectId) -> Result<Option<u8>, ServiceError> {
        let record = self.store.get_sentiment(subject_id).await?;
        Ok(record.and_then(|r| r.percentage))
    }

    fn from_resolution(resolution: JobResolution) -> RatingResponse {
        let subject_id = resolution.subject_id;
        if resolution.retry_in_secs.is_some() {
            return RatingResponse::status(subject_id, RatingStatus::Queued);
        }

        match resolution.outcome {
            JobOutcome::Stored { percentage } | JobOutcome::AlreadyPresent { percentage } => {
                RatingResponse::fetched(subject_id, percentage)
            }
            JobOutcome::NoData | JobOutcome::Skipped => {
                RatingResponse::status(subject_id, RatingStatus::NotFound)
            }
            JobOutcome::Failed { .. } => RatingResponse::status(subject_id, RatingStatus::Error),
        }
    }
}
