//! Persisted sentiment data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SubjectId;

/// Stored sentiment for one subject.
///
/// Once `percentage` is present it is never overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub subject_id: SubjectId,
    pub percentage: Option<u8>,
    #[serde(default)]
    pub search_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_searched_at: Option<DateTime<Utc>>,
}

impl SentimentRecord {
    pub fn has_percentage(&self) -> bool {
        self.percentage.is_some()
    }
}

/// One round trip to the sentiment provider, kept for budgeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCall {
    pub subject_id: SubjectId,
    pub query: String,
    pub cost: f64,
    pub latency_ms: u64,
    /// Outcome label, e.g. `stored`, `no_data`, `failed`.
    pub outcome: String,
}
