//! Provider call log used for request budgeting.

use rating_core::ProviderCall;
use serde::Deserialize;

use crate::{Database, DbError};

/// Repository for provider call records.
pub struct ProviderCallRepository;

/// Aggregate usage over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct CallUsage {
    #[serde(default)]
    pub calls: u64,
    #[serde(default)]
    pub cost: f64,
}

const RECORD_CALL: &str = r#"
CREATE provider_call SET
    subject_id = $subject_id,
    search_query = $search_query,
    cost = $cost,
    latency_ms = $latency_ms,
    outcome = $outcome,
    called_at = time::now();
"#;

const USAGE_SINCE: &str = r#"
SELECT count() AS calls, math::sum(cost) AS cost
FROM provider_call
WHERE called_at > time::now() - type::duration($window)
GROUP ALL;
"#;

impl ProviderCallRepository {
    /// Append one provider round trip.
    pub async fn record(db: &Database, call: &ProviderCall) -> Result<(), DbError> {
        db.query(RECORD_CALL)
            .bind(("subject_id", call.subject_id.to_string()))
            .bind(("search_query", call.query.clone()))
            .bind(("cost", call.cost))
            .bind(("latency_ms", call.latency_ms as i64))
            .bind(("outcome", call.outcome.clone()))
            .await?
            .check()?;
        Ok(())
    }

    /// Calls and spend within the last `window_days` days.
    pub async fn usage_since(db: &Database, window_days: u32) -> Result<CallUsage, DbError> {
        let mut result = db
            .query(USAGE_SINCE)
            .bind(("window", format!("{}d", window_days)))
            .await?;

        let rows: Vec<CallUsage> = result.take(0)?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }
}
