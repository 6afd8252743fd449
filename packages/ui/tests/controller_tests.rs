#![allow(clippy::disallowed_methods)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::ServerFnError;
use rating_core::{RatingResponse, RatingStatus, RequestOrigin, RequestStatus, SubjectId};
use tokio::time::Instant;
use ui::rating::{ApiFuture, PollConfig, PollingController, RatingApi};

type Reply = Result<(RatingStatus, Option<u8>), String>;

/// Rating API that replays scripted replies after a fixed latency.
///
/// Polls past the end of the script answer `queued`.
#[derive(Default)]
struct FakeApi {
    requests: RefCell<VecDeque<Reply>>,
    polls: RefCell<VecDeque<Reply>>,
    latency: Duration,
    origins: RefCell<Vec<(String, RequestOrigin)>>,
    poll_count: Cell<u32>,
}

impl FakeApi {
    fn new(requests: Vec<Reply>, polls: Vec<Reply>, latency: Duration) -> Self {
        Self {
            requests: RefCell::new(requests.into()),
            polls: RefCell::new(polls.into()),
            latency,
            ..Self::default()
        }
    }

    fn origins(&self) -> Vec<RequestOrigin> {
        self.origins.borrow().iter().map(|(_, o)| *o).collect()
    }

    fn respond(&self, subject_id: &SubjectId, reply: Reply) -> ApiFuture<'_> {
        let subject_id = subject_id.clone();
        let latency = self.latency;
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            reply
                .map(|(status, percentage)| RatingResponse {
                    subject_id,
                    percentage,
                    status,
                    cached: false,
                })
                .map_err(ServerFnError::new)
        })
    }
}

impl RatingApi for FakeApi {
    fn get_rating(&self, subject_id: &SubjectId) -> ApiFuture<'_> {
        self.poll_count.set(self.poll_count.get() + 1);
        let reply = self
            .polls
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok((RatingStatus::Queued, None)));
        self.respond(subject_id, reply)
    }

    fn request_rating(&self, subject_id: &SubjectId, origin: RequestOrigin) -> ApiFuture<'_> {
        self.origins
            .borrow_mut()
            .push((subject_id.to_string(), origin));
        let reply = self
            .requests
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok((RatingStatus::Queued, None)));
        self.respond(subject_id, reply)
    }
}

fn id(raw: &str) -> SubjectId {
    SubjectId::parse(raw).unwrap()
}

fn queued() -> Reply {
    Ok((RatingStatus::Queued, None))
}

fn found(percentage: u8) -> Reply {
    Ok((RatingStatus::Found, Some(percentage)))
}

/// Controller plus the distinct statuses it passed through.
fn controller(
    api: FakeApi,
    config: PollConfig,
) -> (PollingController<FakeApi>, Rc<RefCell<Vec<RequestStatus>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let controller = PollingController::new(api, config).with_listener(move |view| {
        let mut log = log.borrow_mut();
        if log.last() != Some(&view.status) {
            log.push(view.status);
        }
    });
    (controller, seen)
}

#[tokio::test(start_paused = true)]
async fn test_completes_when_sixth_poll_finds_rating() {
    let mut polls = vec![queued(); 5];
    polls.push(found(82));
    let api = FakeApi::new(vec![queued()], polls, Duration::ZERO);
    let (controller, seen) = controller(api, PollConfig::default());

    let started = Instant::now();
    controller.mount(id("m1"), None).await;

    let view = controller.view();
    assert_eq!(view.status, RequestStatus::Completed);
    assert_eq!(view.percentage, Some(82));
    assert_eq!(view.polls, 6);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(
        *seen.borrow(),
        vec![
            RequestStatus::Idle,
            RequestStatus::Pending,
            RequestStatus::Fetching,
            RequestStatus::Completed
        ]
    );
    assert_eq!(controller.api().origins(), vec![RequestOrigin::Background]);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_fails_then_accepts_trigger() {
    let api = FakeApi::new(
        vec![Ok((RatingStatus::NotFound, None)), found(64)],
        vec![],
        Duration::from_millis(20),
    );
    let (controller, seen) = controller(api, PollConfig::default());

    controller.mount(id("m1"), None).await;
    assert_eq!(controller.view().status, RequestStatus::Failed);
    assert_eq!(controller.api().poll_count.get(), 0);

    controller.trigger().await;
    let view = controller.view();
    assert_eq!(view.status, RequestStatus::Completed);
    assert_eq!(view.percentage, Some(64));

    assert_eq!(
        *seen.borrow(),
        vec![
            RequestStatus::Idle,
            RequestStatus::Pending,
            RequestStatus::Failed,
            RequestStatus::Pending,
            RequestStatus::Completed
        ]
    );
    assert_eq!(
        controller.api().origins(),
        vec![RequestOrigin::Background, RequestOrigin::User]
    );
}

#[tokio::test(start_paused = true)]
async fn test_mount_twice_requests_once() {
    let api = FakeApi::new(vec![found(70)], vec![], Duration::from_millis(100));
    let (controller, _) = controller(api, PollConfig::default());

    tokio::join!(
        controller.mount(id("m1"), None),
        controller.mount(id("m1"), None),
    );
    // A later remount of the same subject does not fire again either
    controller.mount(id("m1"), None).await;

    assert_eq!(controller.api().origins().len(), 1);
    assert_eq!(controller.view().status, RequestStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_trigger_ignored_while_in_flight() {
    let api = FakeApi::new(vec![found(70)], vec![], Duration::from_millis(100));
    let (controller, _) = controller(api, PollConfig::default());

    tokio::join!(controller.mount(id("m1"), None), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(controller.view().status, RequestStatus::Pending);
        controller.trigger().await;
    });

    assert_eq!(controller.api().origins(), vec![RequestOrigin::Background]);
    assert_eq!(controller.view().status, RequestStatus::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_stale_subject_result_discarded() {
    let api = FakeApi::new(vec![found(50)], vec![], Duration::from_millis(200));
    let (controller, _) = controller(api, PollConfig::default());

    tokio::join!(controller.mount(id("m1"), None), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(controller.set_subject(id("m2")));
    });

    let view = controller.view();
    assert_eq!(view.subject_id, Some(id("m2")));
    assert_eq!(view.status, RequestStatus::Idle);
    assert_eq!(view.percentage, None);
}

#[tokio::test(start_paused = true)]
async fn test_subject_change_stops_poll_loop() {
    let api = FakeApi::new(vec![queued()], vec![], Duration::ZERO);
    let (controller, _) = controller(api, PollConfig::default());

    tokio::join!(controller.mount(id("m1"), None), async {
        tokio::time::sleep(Duration::from_millis(1_200)).await;
        controller.set_subject(id("m2"));
    });

    // Polls at 500ms and 1000ms; the tick at 1500ms sees the new subject
    assert_eq!(controller.api().poll_count.get(), 2);
    assert_eq!(controller.view().status, RequestStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_cached_mount_skips_request() {
    let api = FakeApi::new(vec![], vec![], Duration::ZERO);
    let (controller, _) = controller(api, PollConfig::default());

    controller.mount(id("m1"), Some(91)).await;

    let view = controller.view();
    assert_eq!(view.status, RequestStatus::Completed);
    assert_eq!(view.percentage, Some(91));
    assert!(controller.api().origins().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_auto_trigger_disabled_waits_for_user() {
    let api = FakeApi::new(vec![found(40)], vec![], Duration::ZERO);
    let (controller, _) = controller(api, PollConfig::default().with_auto_trigger(false));

    controller.mount(id("m1"), None).await;
    assert_eq!(controller.view().status, RequestStatus::Idle);

    controller.trigger().await;
    assert_eq!(controller.view().status, RequestStatus::Completed);
    assert_eq!(controller.api().origins(), vec![RequestOrigin::User]);
}

#[tokio::test(start_paused = true)]
async fn test_poll_budget_exhausted_fails() {
    let api = FakeApi::new(vec![queued()], vec![], Duration::ZERO);
    let (controller, _) = controller(api, PollConfig::default().with_max_polls(3));

    let started = Instant::now();
    controller.mount(id("m1"), None).await;

    assert_eq!(controller.view().status, RequestStatus::Failed);
    assert_eq!(controller.api().poll_count.get(), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(1_500));
}

#[tokio::test(start_paused = true)]
async fn test_wall_clock_timeout_fails() {
    // Slow polls hit the timeout long before the poll budget
    let api = FakeApi::new(vec![queued()], vec![], Duration::from_millis(900));
    let (controller, _) = controller(api, PollConfig::default());

    let started = Instant::now();
    controller.mount(id("m1"), None).await;

    let view = controller.view();
    assert_eq!(view.status, RequestStatus::Failed);
    assert!(view.error.is_some());
    assert!(view.polls < 10);
    assert_eq!(started.elapsed(), Duration::from_millis(900 + 5_000));
}

#[tokio::test(start_paused = true)]
async fn test_transport_errors_keep_polling() {
    let api = FakeApi::new(
        vec![queued()],
        vec![Err("connection reset".into()), Ok((RatingStatus::Error, None)), found(77)],
        Duration::ZERO,
    );
    let (controller, _) = controller(api, PollConfig::default());

    controller.mount(id("m1"), None).await;

    let view = controller.view();
    assert_eq!(view.status, RequestStatus::Completed);
    assert_eq!(view.percentage, Some(77));
    assert_eq!(view.polls, 3);
}

#[tokio::test(start_paused = true)]
async fn test_request_transport_error_fails() {
    let api = FakeApi::new(vec![Err("offline".into())], vec![], Duration::ZERO);
    let (controller, _) = controller(api, PollConfig::default());

    controller.mount(id("m1"), None).await;

    let view = controller.view();
    assert_eq!(view.status, RequestStatus::Failed);
    assert!(view.error.unwrap().contains("offline"));
}

#[tokio::test(start_paused = true)]
async fn test_limit_reached_is_terminal() {
    let api = FakeApi::new(vec![Ok((RatingStatus::LimitReached, None))], vec![], Duration::ZERO);
    let (controller, _) = controller(api, PollConfig::default());

    controller.mount(id("m1"), None).await;

    assert_eq!(controller.view().status, RequestStatus::LimitReached);
    assert_eq!(controller.api().poll_count.get(), 0);
}
