//! Enrichment queue configuration, retry policy and status snapshots.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{EnrichmentJob, JobOutcome, Priority, SubjectId};

/// Configuration for queue behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Pause between two provider calls (milliseconds).
    pub pacing_ms: u64,
    /// Delay before retrying a job whose provider had no data (seconds).
    pub no_data_retry_delay_secs: u64,
    /// Delay before retrying a job whose provider call failed (seconds).
    pub failure_retry_delay_secs: u64,
    /// Attempts a high-priority job gets before it is dropped.
    pub max_attempts: u32,
    /// Upper bound on a single job execution (seconds).
    pub job_timeout_secs: u64,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 1_000,
            no_data_retry_delay_secs: 5 * 60,
            failure_retry_delay_secs: 10 * 60,
            max_attempts: 3,
            job_timeout_secs: 60,
            event_capacity: 1024,
        }
    }
}

impl QueueConfig {
    /// Set the pacing interval.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing_ms = pacing.as_millis() as u64;
        self
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// Delay before the job should run again, or `None` when it is finished.
    ///
    /// Only high-priority jobs are retried, and only while they have
    /// attempts left. `attempt_count` already includes the attempt that
    /// produced `outcome`.
    pub fn retry_delay(&self, job: &EnrichmentJob, outcome: &JobOutcome) -> Option<Duration> {
        if job.priority != Priority::High || job.attempt_count >= self.max_attempts {
            return None;
        }

        match outcome {
            JobOutcome::NoData => Some(Duration::from_secs(self.no_data_retry_delay_secs)),
            JobOutcome::Failed { .. } => Some(Duration::from_secs(self.failure_retry_delay_secs)),
            _ => None,
        }
    }
}

/// A queued job as shown in status snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedJobSummary {
    pub subject_id: SubjectId,
    pub display_title: String,
    pub priority: Priority,
    pub attempt_count: u32,
}

impl From<&EnrichmentJob> for QueuedJobSummary {
    fn from(job: &EnrichmentJob) -> Self {
        Self {
            subject_id: job.subject_id.clone(),
            display_title: job.display_title.clone(),
            priority: job.priority,
            attempt_count: job.attempt_count,
        }
    }
}

/// A delayed retry waiting for its timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRetrySummary {
    pub subject_id: SubjectId,
    pub display_title: String,
    pub attempt_count: u32,
    pub due_in_secs: u64,
}

/// Read-only snapshot of the enrichment queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueStatus {
    pub queued_count: usize,
    pub in_flight_count: usize,
    pub is_draining: bool,
    /// Pending jobs in processing order.
    pub queued_jobs: Vec<QueuedJobSummary>,
    /// Delayed retries, soonest first.
    pub scheduled_retries: Vec<ScheduledRetrySummary>,
}

impl QueueStatus {
    /// Jobs that are pending or running.
    pub fn active(&self) -> usize {
        self.queued_count + self.in_flight_count
    }

    /// Whether nothing is pending, running or waiting to retry.
    pub fn is_idle(&self) -> bool {
        self.active() == 0 && self.scheduled_retries.is_empty()
    }
}
