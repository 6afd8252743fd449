//! Event types for real-time updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EnrichmentJob, JobId, JobOutcome, SubjectId};

/// Events emitted by the enrichment queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EnrichmentEvent {
    // Queue events
    /// The drain loop started.
    DrainStarted { timestamp: DateTime<Utc> },
    /// The drain loop found nothing pending and stopped.
    DrainIdle { timestamp: DateTime<Utc> },

    // Job events
    /// A new job was enqueued.
    JobEnqueued {
        job: EnrichmentJob,
        timestamp: DateTime<Utc>,
    },
    /// An enqueue was ignored because the subject is already pending or running.
    JobDeduplicated {
        subject_id: SubjectId,
        timestamp: DateTime<Utc>,
    },
    /// A job was handed to the worker.
    JobStarted {
        job_id: JobId,
        subject_id: SubjectId,
        attempt: u32,
        timestamp: DateTime<Utc>,
    },
    /// A job attempt finished.
    JobFinished {
        job_id: JobId,
        subject_id: SubjectId,
        outcome: JobOutcome,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    /// A job will be re-inserted after a delay.
    RetryScheduled {
        job_id: JobId,
        subject_id: SubjectId,
        attempt: u32,
        delay_secs: u64,
        timestamp: DateTime<Utc>,
    },
    /// A scheduled retry was cancelled before it fired.
    RetryCancelled {
        subject_id: SubjectId,
        timestamp: DateTime<Utc>,
    },
    /// A job gave up without a percentage.
    JobDropped {
        job_id: JobId,
        subject_id: SubjectId,
        attempts: u32,
        timestamp: DateTime<Utc>,
    },
}

impl EnrichmentEvent {
    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            EnrichmentEvent::DrainStarted { .. } => "Drain loop started".to_string(),
            EnrichmentEvent::DrainIdle { .. } => "Drain loop idle".to_string(),
            EnrichmentEvent::JobEnqueued { job, .. } => {
                format!("Job {} enqueued for {} ({})", job.id, job.subject_id, job.priority)
            }
            EnrichmentEvent::JobDeduplicated { subject_id, .. } => {
                format!("Subject {} already queued", subject_id)
            }
            EnrichmentEvent::JobStarted {
                job_id,
                subject_id,
                attempt,
                ..
            } => format!("Job {} started for {} (attempt {})", job_id, subject_id, attempt),
            EnrichmentEvent::JobFinished {
                job_id,
                outcome,
                duration_ms,
                ..
            } => format!("Job {} {} in {}ms", job_id, outcome.as_str(), duration_ms),
            EnrichmentEvent::RetryScheduled {
                job_id, delay_secs, ..
            } => format!("Job {} retrying in {}s", job_id, delay_secs),
            EnrichmentEvent::RetryCancelled { subject_id, .. } => {
                format!("Retry for {} cancelled", subject_id)
            }
            EnrichmentEvent::JobDropped {
                job_id, attempts, ..
            } => format!("Job {} dropped after {} attempts", job_id, attempts),
        }
    }
}
