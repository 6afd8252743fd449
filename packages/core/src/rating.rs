//! Request-boundary vocabulary and the client-side request lifecycle.

use serde::{Deserialize, Serialize};

use crate::{Priority, SubjectId};

/// Status reported by the rating read/request operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingStatus {
    /// A percentage is available.
    Found,
    /// No percentage and no work pending for the subject.
    NotFound,
    /// Work for the subject is queued, running or waiting to retry.
    Queued,
    /// The lookup itself failed.
    Error,
    /// The global request budget is spent.
    LimitReached,
}

impl RatingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingStatus::Found => "found",
            RatingStatus::NotFound => "not_found",
            RatingStatus::Queued => "queued",
            RatingStatus::Error => "error",
            RatingStatus::LimitReached => "limit_reached",
        }
    }
}

impl std::fmt::Display for RatingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response body of `GET` and `POST /api/rating/:subject_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingResponse {
    pub subject_id: SubjectId,
    pub percentage: Option<u8>,
    pub status: RatingStatus,
    /// True when the percentage came from the store rather than a fresh fetch.
    #[serde(default)]
    pub cached: bool,
}

impl RatingResponse {
    /// A percentage read back from the store.
    pub fn cached(subject_id: SubjectId, percentage: u8) -> Self {
        Self {
            subject_id,
            percentage: Some(percentage),
            status: RatingStatus::Found,
            cached: true,
        }
    }

    /// A percentage fetched while the caller waited.
    pub fn fetched(subject_id: SubjectId, percentage: u8) -> Self {
        Self {
            subject_id,
            percentage: Some(percentage),
            status: RatingStatus::Found,
            cached: false,
        }
    }

    /// A response without a percentage.
    pub fn status(subject_id: SubjectId, status: RatingStatus) -> Self {
        Self {
            subject_id,
            percentage: None,
            status,
            cached: false,
        }
    }
}

/// Who asked for a rating. Decides the job priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOrigin {
    /// Explicit user action, e.g. a "get rating" button.
    User,
    /// Triggered automatically, e.g. on page mount.
    #[default]
    Background,
}

impl RequestOrigin {
    pub fn priority(self) -> Priority {
        match self {
            RequestOrigin::User => Priority::High,
            RequestOrigin::Background => Priority::Normal,
        }
    }
}

/// Client-visible lifecycle of one rating request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestStatus {
    #[default]
    Idle,
    /// The initial request is in flight.
    Pending,
    /// The request was queued; polling for the result.
    Fetching,
    Completed,
    Failed,
    LimitReached,
}

impl RequestStatus {
    /// Whether a request or poll loop is running.
    pub fn is_busy(self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::Fetching)
    }

    /// Whether no further automatic transition will happen.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestStatus::Completed | RequestStatus::Failed | RequestStatus::LimitReached
        )
    }

    /// Whether an explicit user action may start a new request.
    pub fn accepts_trigger(self) -> bool {
        !self.is_busy()
    }

    /// State after the initial request returns.
    pub fn after_request(status: RatingStatus) -> Self {
        match status {
            RatingStatus::Found => RequestStatus::Completed,
            RatingStatus::Queued => RequestStatus::Fetching,
            RatingStatus::NotFound | RatingStatus::Error => RequestStatus::Failed,
            RatingStatus::LimitReached => RequestStatus::LimitReached,
        }
    }

    /// State after a poll returns, or `None` to keep polling.
    pub fn after_poll(status: RatingStatus) -> Option<Self> {
        match status {
            RatingStatus::Found => Some(RequestStatus::Completed),
            RatingStatus::NotFound => Some(RequestStatus::Failed),
            RatingStatus::LimitReached => Some(RequestStatus::LimitReached),
            RatingStatus::Queued | RatingStatus::Error => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Pending => "pending",
            RequestStatus::Fetching => "fetching",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
            RequestStatus::LimitReached => "limitReached",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
