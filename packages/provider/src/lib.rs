//! Sentiment provider client.
//!
//! The [`SentimentProvider`] trait is the seam the enrichment worker calls;
//! [`SearchApiProvider`] is the HTTP implementation that reads the
//! "NN% liked this" snippet out of a search API response.

mod error;
mod extract;
mod search_api;

use std::future::Future;
use std::pin::Pin;

pub use error::ProviderError;
pub use extract::{extract_percentage, liked_pattern};
pub use search_api::{ProviderConfig, SearchApiProvider};

/// Result of one provider round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentFetch {
    /// `None` when the provider answered but had no percentage.
    pub percentage: Option<u8>,
    /// Cost charged for the call, in the provider's currency.
    pub cost: f64,
    pub latency_ms: u64,
}

/// Future type for provider calls.
pub type ProviderFuture<'a> =
    Pin<Box<dyn Future<Output = Result<SentimentFetch, ProviderError>> + Send + 'a>>;

/// A source of audience sentiment percentages.
pub trait SentimentProvider: Send + Sync + 'static {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Look up the percentage for a free-text query such as `"Heat 1995 movie"`.
    ///
    /// Returns [`ProviderError::NotConfigured`] without any I/O when
    /// credentials are missing.
    fn fetch_sentiment<'a>(&'a self, query: &'a str) -> ProviderFuture<'a>;
}
