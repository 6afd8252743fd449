#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actors::{SentimentJobProcessor, start_enrichment_queue};
use db::{BudgetConfig, DbConfig, SentimentStore, SurrealSentimentStore};
use provider::{ProviderError, ProviderFuture, SentimentFetch, SentimentProvider};
use rating_core::{QueueConfig, Subject, SubjectId, SubjectKind};
use service::{RatingService, RatingServiceConfig};

/// Provider with a fixed latency that replays canned percentages.
pub struct FakeProvider {
    responses: Mutex<VecDeque<Option<u8>>>,
    latency: Duration,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(responses: Vec<Option<u8>>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            latency,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SentimentProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn fetch_sentiment<'a>(&'a self, _query: &'a str) -> ProviderFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let percentage = self.responses.lock().unwrap().pop_front().flatten();
        let latency = self.latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            Ok::<_, ProviderError>(SentimentFetch {
                percentage,
                cost: 0.01,
                latency_ms: latency.as_millis() as u64,
            })
        })
    }
}

pub struct Harness {
    pub service: RatingService,
    pub store: Arc<SurrealSentimentStore>,
    pub provider: Arc<FakeProvider>,
}

pub fn id(raw: &str) -> SubjectId {
    SubjectId::parse(raw).unwrap()
}

/// Service over an in-memory store seeded with `m1` and `m2`.
pub async fn harness(
    provider: Arc<FakeProvider>,
    budget: BudgetConfig,
    immediate_wait: Duration,
) -> Harness {
    let db = db::init(&DbConfig::memory()).await.unwrap();
    let store = Arc::new(SurrealSentimentStore::new(db).with_budget(budget));

    for (raw, title) in [("m1", "Heat"), ("m2", "Alien")] {
        let subject = Subject::new(id(raw), title, SubjectKind::Movie);
        store.upsert_subject(&subject).await.unwrap();
    }

    let processor = Arc::new(SentimentJobProcessor::new(provider.clone(), store.clone()));
    let config = QueueConfig::default().with_pacing(Duration::from_millis(10));
    let (queue, _handle) = start_enrichment_queue(config, processor).await.unwrap();

    let service = RatingService::new(store.clone(), queue)
        .with_config(RatingServiceConfig::default().with_immediate_wait(immediate_wait));

    Harness {
        service,
        store,
        provider,
    }
}
