#![allow(clippy::disallowed_methods)]

mod common;

use std::time::Duration;

use common::{FakeProvider, harness, id};
use db::{BudgetConfig, SentimentStore};
use rating_core::{ProviderCall, RatingResponse, RatingStatus, RequestOrigin};
use service::RatingService;

/// Poll `read` until it reports a percentage.
async fn read_until_found(service: &RatingService, raw: &str) -> RatingResponse {
    for _ in 0..200 {
        let response = service.read(&id(raw)).await;
        if response.status == RatingStatus::Found {
            return response;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("{} never resolved", raw);
}

#[tokio::test]
async fn test_queued_then_found() {
    let provider = FakeProvider::new(vec![Some(82)], Duration::from_millis(300));
    let h = harness(provider, BudgetConfig::default(), Duration::from_millis(50)).await;

    let response = h.service.request(&id("m1"), RequestOrigin::User).await;
    assert_eq!(response.status, RatingStatus::Queued);
    assert_eq!(response.percentage, None);

    assert_eq!(h.service.read(&id("m1")).await.status, RatingStatus::Queued);

    let response = read_until_found(&h.service, "m1").await;
    assert_eq!(response.percentage, Some(82));
    assert!(response.cached);
    assert_eq!(h.provider.calls(), 1);
}

#[tokio::test]
async fn test_immediate_fetch_then_cached() {
    let provider = FakeProvider::new(vec![Some(64)], Duration::from_millis(20));
    let h = harness(provider, BudgetConfig::default(), Duration::from_secs(3)).await;

    let first = h.service.request(&id("m1"), RequestOrigin::User).await;
    assert_eq!(first.status, RatingStatus::Found);
    assert_eq!(first.percentage, Some(64));
    assert!(!first.cached);

    let second = h.service.request(&id("m1"), RequestOrigin::User).await;
    assert_eq!(second.status, RatingStatus::Found);
    assert!(second.cached);
    assert_eq!(h.provider.calls(), 1);
}

#[tokio::test]
async fn test_read_has_no_side_effects() {
    let provider = FakeProvider::new(vec![Some(70)], Duration::from_millis(10));
    let h = harness(provider, BudgetConfig::default(), Duration::from_secs(1)).await;

    let response = h.service.read(&id("m1")).await;
    assert_eq!(response.status, RatingStatus::NotFound);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.provider.calls(), 0);
    assert!(h.service.queue_status().await.unwrap().is_idle());
}

#[tokio::test]
async fn test_budget_exhausted() {
    let provider = FakeProvider::new(vec![Some(70)], Duration::from_millis(10));
    let h = harness(provider, BudgetConfig::monthly(1), Duration::from_secs(1)).await;

    h.store
        .record_provider_call(&ProviderCall {
            subject_id: id("m2"),
            query: "Alien movie".into(),
            cost: 0.01,
            latency_ms: 10,
            outcome: "stored".into(),
        })
        .await
        .unwrap();

    let response = h.service.request(&id("m1"), RequestOrigin::User).await;
    assert_eq!(response.status, RatingStatus::LimitReached);

    let status = h.service.queue_status().await.unwrap();
    assert!(status.is_idle());
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn test_cached_percentage_ignores_budget() {
    let provider = FakeProvider::new(vec![], Duration::from_millis(10));
    let h = harness(provider, BudgetConfig::monthly(0), Duration::from_secs(1)).await;

    h.store.set_sentiment(&id("m1"), 55).await.unwrap();

    let response = h.service.request(&id("m1"), RequestOrigin::User).await;
    assert_eq!(response.status, RatingStatus::Found);
    assert_eq!(response.percentage, Some(55));
    assert!(response.cached);
}

#[tokio::test]
async fn test_unknown_subject_not_found() {
    let provider = FakeProvider::new(vec![Some(70)], Duration::from_millis(10));
    let h = harness(provider, BudgetConfig::default(), Duration::from_secs(1)).await;

    let response = h.service.request(&id("missing"), RequestOrigin::User).await;
    assert_eq!(response.status, RatingStatus::NotFound);
    assert_eq!(h.provider.calls(), 0);
}

#[tokio::test]
async fn test_rapid_requests_enqueue_one_job() {
    let provider = FakeProvider::new(vec![Some(91)], Duration::from_millis(300));
    let h = harness(provider, BudgetConfig::default(), Duration::from_millis(50)).await;

    let m1 = id("m1");
    let (first, second) = tokio::join!(
        h.service.request(&m1, RequestOrigin::Background),
        h.service.request(&m1, RequestOrigin::User),
    );

    for response in [&first, &second] {
        assert!(matches!(
            response.status,
            RatingStatus::Queued | RatingStatus::Found
        ));
    }

    read_until_found(&h.service, "m1").await;
    assert_eq!(h.provider.calls(), 1);
}

#[tokio::test]
async fn test_background_no_data_is_not_found() {
    let provider = FakeProvider::new(vec![None], Duration::from_millis(10));
    let h = harness(provider, BudgetConfig::default(), Duration::from_secs(2)).await;

    let response = h.service.request(&id("m1"), RequestOrigin::Background).await;
    assert_eq!(response.status, RatingStatus::NotFound);

    let status = h.service.queue_status().await.unwrap();
    assert!(status.scheduled_retries.is_empty());

    let record = h.store.get_sentiment(&id("m1")).await.unwrap().unwrap();
    assert_eq!(record.search_count, 1);
}

#[tokio::test]
async fn test_user_no_data_schedules_retry() {
    let provider = FakeProvider::new(vec![None], Duration::from_millis(10));
    let h = harness(provider, BudgetConfig::default(), Duration::from_secs(2)).await;

    let response = h.service.request(&id("m1"), RequestOrigin::User).await;
    assert_eq!(response.status, RatingStatus::Queued);

    let status = h.service.queue_status().await.unwrap();
    assert_eq!(status.scheduled_retries.len(), 1);
    assert_eq!(h.service.read(&id("m1")).await.status, RatingStatus::Queued);

    assert!(h.service.queue().cancel_retry(&id("m1")).await.unwrap());
    assert_eq!(h.service.read(&id("m1")).await.status, RatingStatus::NotFound);
}
