//! Enrichment job types for work items in the queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{Subject, SubjectId, SubjectKind};

/// Unique identifier for a job, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Create a new unique job ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority class used to pick the next job.
///
/// Ordering follows the numeric rank: `High` (0) sorts before `Normal` (1),
/// which sorts before `Low` (2).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High = 0,
    #[default]
    Normal = 1,
    Low = 2,
}

impl Priority {
    /// Numeric rank; lower is processed first.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Normal => write!(f, "normal"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// A request to fetch the sentiment percentage for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentJob {
    /// Unique identifier for this job. Stable across retries.
    pub id: JobId,
    /// Catalog subject this job enriches.
    pub subject_id: SubjectId,
    /// Title used to build the provider query.
    pub display_title: String,
    /// Movie or series.
    pub subject_kind: SubjectKind,
    /// Release year, appended to the query when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<u16>,
    /// Execution priority.
    pub priority: Priority,
    /// Number of provider attempts made so far.
    #[serde(default)]
    pub attempt_count: u32,
    /// When the last attempt was dispatched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    /// When the job was first enqueued.
    pub enqueued_at: DateTime<Utc>,
}

impl EnrichmentJob {
    /// Create a new job with normal priority and no attempts.
    pub fn new(subject_id: SubjectId, display_title: impl Into<String>, kind: SubjectKind) -> Self {
        Self {
            id: JobId::new(),
            subject_id,
            display_title: display_title.into(),
            subject_kind: kind,
            release_year: None,
            priority: Priority::default(),
            attempt_count: 0,
            last_attempt_at: None,
            enqueued_at: Utc::now(),
        }
    }

    /// Create a job for a catalog subject.
    pub fn for_subject(subject: &Subject) -> Self {
        let mut job = Self::new(subject.id.clone(), subject.title.clone(), subject.kind);
        job.release_year = subject.release_year;
        job
    }

    /// Set the priority for this job.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Record the start of a new provider attempt.
    pub fn begin_attempt(&mut self, now: DateTime<Utc>) {
        self.attempt_count = self.attempt_count.saturating_add(1);
        self.last_attempt_at = Some(now);
    }

    /// Search query sent to the sentiment provider.
    pub fn provider_query(&self) -> String {
        let title = self.display_title.trim();
        match self.release_year {
            Some(year) => format!("{} {} {}", title, year, self.subject_kind.query_suffix()),
            None => format!("{} {}", title, self.subject_kind.query_suffix()),
        }
    }
}

/// Result of processing one job attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JobOutcome {
    /// Provider returned a percentage and it was persisted.
    Stored { percentage: u8 },
    /// The store already held a percentage; no provider call was made.
    AlreadyPresent { percentage: u8 },
    /// Provider answered but had no percentage for this subject.
    NoData,
    /// Provider call or store write failed.
    Failed { error: String },
    /// Provider credentials are absent; nothing was attempted.
    Skipped,
}

impl JobOutcome {
    /// Whether this outcome may be retried under the high-priority policy.
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobOutcome::NoData | JobOutcome::Failed { .. })
    }

    /// Percentage known after this outcome, if any.
    pub fn percentage(&self) -> Option<u8> {
        match self {
            JobOutcome::Stored { percentage } | JobOutcome::AlreadyPresent { percentage } => {
                Some(*percentage)
            }
            _ => None,
        }
    }

    /// Short label for logs and provider-call records.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Stored { .. } => "stored",
            JobOutcome::AlreadyPresent { .. } => "already_present",
            JobOutcome::NoData => "no_data",
            JobOutcome::Failed { .. } => "failed",
            JobOutcome::Skipped => "skipped",
        }
    }
}

/// What a waiter learns once the queue has dealt with a job attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResolution {
    pub subject_id: SubjectId,
    pub outcome: JobOutcome,
    /// Seconds until the scheduled retry, when one was scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_in_secs: Option<u64>,
}

impl JobResolution {
    /// Whether the job will run again later.
    pub fn will_retry(&self) -> bool {
        self.retry_in_secs.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject_id(s: &str) -> SubjectId {
        SubjectId::parse(s).unwrap()
    }

    #[test]
    fn priority_orders_by_rank() {
        assert!(Priority::High < Priority::Normal);
        assert!(Priority::Normal < Priority::Low);
        assert_eq!(Priority::High.rank(), 0);
        assert_eq!(Priority::Low.rank(), 2);
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert!("critical".parse::<Priority>().is_err());
    }

    #[test]
    fn provider_query_includes_kind_and_year() {
        let job = EnrichmentJob::new(subject_id("m1"), " Heat ", SubjectKind::Movie);
        assert_eq!(job.provider_query(), "Heat movie");

        let subject = Subject::new(subject_id("s1"), "The Office", SubjectKind::Series)
            .with_release_year(2005);
        let job = EnrichmentJob::for_subject(&subject);
        assert_eq!(job.provider_query(), "The Office 2005 tv series");
        assert_eq!(job.priority, Priority::Normal);
    }

    #[test]
    fn begin_attempt_counts_and_stamps() {
        let mut job = EnrichmentJob::new(subject_id("m1"), "Heat", SubjectKind::Movie);
        let now = Utc::now();
        job.begin_attempt(now);
        job.begin_attempt(now);
        assert_eq!(job.attempt_count, 2);
        assert_eq!(job.last_attempt_at, Some(now));
    }

    #[test]
    fn outcome_classification() {
        assert!(JobOutcome::NoData.is_retryable());
        assert!(JobOutcome::Failed { error: "boom".into() }.is_retryable());
        assert!(!JobOutcome::Skipped.is_retryable());
        assert!(!JobOutcome::Stored { percentage: 82 }.is_retryable());
        assert_eq!(JobOutcome::AlreadyPresent { percentage: 7 }.percentage(), Some(7));

        let json = serde_json::to_value(JobOutcome::Stored { percentage: 82 }).unwrap();
        assert_eq!(json["outcome"], "stored");
        assert_eq!(json["percentage"], 82);
    }
}
