//! HTTP sentiment provider backed by a Google search API.

use std::time::{Duration, Instant};

use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::{
    ProviderError, ProviderFuture, SentimentFetch, SentimentProvider, extract_percentage,
    liked_pattern,
};

/// Search API provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key. `None` leaves the provider unconfigured.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Cost recorded for every successful round trip.
    pub cost_per_search: f64,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://serpapi.com".to_string(),
            cost_per_search: 0.01,
            timeout_secs: 30,
            user_agent: "rating-enrichment/0.1".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.trim().is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_cost_per_search(mut self, cost: f64) -> Self {
        self.cost_per_search = cost;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Sentiment provider that queries `GET {base_url}/search`.
pub struct SearchApiProvider {
    client: Client,
    config: ProviderConfig,
    pattern: Regex,
}

impl SearchApiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        let pattern = liked_pattern().map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(Self {
            client,
            config,
            pattern,
        })
    }

    async fn search(&self, query: &str) -> Result<SentimentFetch, ProviderError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(ProviderError::NotConfigured);
        };

        let started = Instant::now();
        let url = format!("{}/search", self.config.base_url);

        tracing::debug!("Searching provider for {:?}", query);

        let response = self
            .client
            .get(&url)
            .query(&[("engine", "google"), ("q", query), ("api_key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Provider returned {} for {:?}", status, query);
            return Err(ProviderError::from_status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        let percentage = extract_percentage(&self.pattern, &body);
        let latency_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            "Provider answered {:?} in {}ms: {:?}",
            query,
            latency_ms,
            percentage
        );

        Ok(SentimentFetch {
            percentage,
            cost: self.config.cost_per_search,
            latency_ms,
        })
    }
}

impl SentimentProvider for SearchApiProvider {
    fn name(&self) -> &str {
        "search-api"
    }

    fn fetch_sentiment<'a>(&'a self, query: &'a str) -> ProviderFuture<'a> {
        Box::pin(self.search(query))
    }
}
