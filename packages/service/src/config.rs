use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the rating service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingServiceConfig {
    /// How long a request waits for its job before answering `queued` (milliseconds).
    pub immediate_wait_ms: u64,
}

impl Default for RatingServiceConfig {
    fn default() -> Self {
        Self {
            immediate_wait_ms: 3_000,
        }
    }
}

impl RatingServiceConfig {
    pub fn with_immediate_wait(mut self, wait: Duration) -> Self {
        self.immediate_wait_ms = wait.as_millis() as u64;
        self
    }

    pub fn immediate_wait(&self) -> Duration {
        Duration::from_millis(self.immediate_wait_ms)
    }
}
