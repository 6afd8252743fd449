//! Request lifecycle for a single rating widget.
//!
//! The controller owns its state, so the guards it enforces do not depend on
//! how often a component re-renders or re-mounts:
//! - the mount auto-trigger fires at most once per subject
//! - user actions are ignored while a request or poll loop is running
//! - results for a subject the controller has moved away from are dropped

use std::cell::RefCell;
use std::future::Future;
use std::pin::{Pin, pin};
use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::ServerFnError;
use futures_util::future::{self, Either};
use rating_core::{RatingResponse, RequestOrigin, RequestStatus, SubjectId};

use crate::timer;

/// Boxed future returned by [`RatingApi`] calls.
pub type ApiFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RatingResponse, ServerFnError>> + 'a>>;

/// The two rating calls the controller makes.
pub trait RatingApi {
    fn get_rating(&self, subject_id: &SubjectId) -> ApiFuture<'_>;

    fn request_rating(&self, subject_id: &SubjectId, origin: RequestOrigin) -> ApiFuture<'_>;
}

/// [`RatingApi`] backed by the fullstack server functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerRatingApi;

impl RatingApi for ServerRatingApi {
    fn get_rating(&self, subject_id: &SubjectId) -> ApiFuture<'_> {
        Box::pin(api::get_rating(subject_id.to_string()))
    }

    fn request_rating(&self, subject_id: &SubjectId, origin: RequestOrigin) -> ApiFuture<'_> {
        Box::pin(api::request_rating(subject_id.to_string(), Some(origin)))
    }
}

/// Polling cadence and mount behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause before each poll.
    pub interval: Duration,
    /// Polls allowed before giving up.
    pub max_polls: u32,
    /// Wall-clock limit for the whole poll loop.
    pub timeout: Duration,
    /// Request a rating on mount when none is cached.
    pub auto_trigger: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_polls: 10,
            timeout: Duration::from_secs(5),
            auto_trigger: true,
        }
    }
}

impl PollConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auto_trigger(mut self, auto_trigger: bool) -> Self {
        self.auto_trigger = auto_trigger;
        self
    }
}

/// What a rating widget renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingView {
    pub subject_id: Option<SubjectId>,
    pub status: RequestStatus,
    pub percentage: Option<u8>,
    /// Polls made by the current request.
    pub polls: u32,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct ControllerState {
    view: RatingView,
    generation: u64,
    started: bool,
}

type Listener = Rc<dyn Fn(&RatingView)>;

/// Drives one widget from idle through request and polling to a terminal state.
pub struct PollingController<A> {
    api: Rc<A>,
    config: PollConfig,
    state: Rc<RefCell<ControllerState>>,
    listener: Option<Listener>,
}

impl<A> Clone for PollingController<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
            listener: self.listener.clone(),
        }
    }
}

impl<A: RatingApi> PollingController<A> {
    pub fn new(api: A, config: PollConfig) -> Self {
        Self {
            api: Rc::new(api),
            config,
            state: Rc::new(RefCell::new(ControllerState::default())),
            listener: None,
        }
    }

    /// Call `listener` with the new view after every state change.
    pub fn with_listener(mut self, listener: impl Fn(&RatingView) + 'static) -> Self {
        self.listener = Some(Rc::new(listener));
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> RatingView {
        self.state.borrow().view.clone()
    }

    /// Switch to another subject.
    ///
    /// Returns `false` if the controller already shows `subject_id`.
    /// Otherwise work for the previous subject is abandoned and the view
    /// resets to idle.
    pub fn set_subject(&self, subject_id: SubjectId) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.view.subject_id.as_ref() == Some(&subject_id) {
                return false;
            }
            state.generation += 1;
            state.started = false;
            state.view = RatingView {
                subject_id: Some(subject_id),
                ..RatingView::default()
            };
        }
        self.notify();
        true
    }

    /// Mount the widget for `subject_id`.
    ///
    /// A cached percentage completes immediately. Otherwise, with
    /// auto-trigger on, one background request is made per subject no
    /// matter how many times mount runs.
    pub async fn mount(&self, subject_id: SubjectId, cached: Option<u8>) {
        self.set_subject(subject_id);

        if let Some(percentage) = cached {
            let generation = self.state.borrow().generation;
            self.apply(generation, |view| {
                if !view.status.is_busy() {
                    view.status = RequestStatus::Completed;
                    view.percentage = Some(percentage);
                }
            });
            return;
        }

        let auto_trigger = self.config.auto_trigger;
        let Some((subject_id, generation)) = self.begin(|state| {
            auto_trigger && !state.started && state.view.status == RequestStatus::Idle
        }) else {
            return;
        };
        self.run(subject_id, RequestOrigin::Background, generation)
            .await;
    }

    /// Explicit user action. Ignored while a request is in flight.
    pub async fn trigger(&self) {
        let Some((subject_id, generation)) =
            self.begin(|state| state.view.status.accepts_trigger())
        else {
            return;
        };
        self.run(subject_id, RequestOrigin::User, generation).await;
    }

    /// Enter `pending` if `guard` allows, before any await.
    fn begin(&self, guard: impl FnOnce(&ControllerState) -> bool) -> Option<(SubjectId, u64)> {
        let started = {
            let mut state = self.state.borrow_mut();
            let subject_id = state.view.subject_id.clone()?;
            if !guard(&state) {
                return None;
            }
            state.started = true;
            state.view.status = RequestStatus::Pending;
            state.view.percentage = None;
            state.view.polls = 0;
            state.view.error = None;
            (subject_id, state.generation)
        };
        self.notify();
        Some(started)
    }

    async fn run(&self, subject_id: SubjectId, origin: RequestOrigin, generation: u64) {
        let result = self.api.request_rating(&subject_id, origin).await;

        let mut next = RequestStatus::Failed;
        let current = self.apply(generation, |view| match result {
            Ok(response) => {
                next = RequestStatus::after_request(response.status);
                view.status = next;
                view.percentage = response.percentage;
            }
            Err(e) => {
                tracing::warn!("Rating request for {} failed: {}", subject_id, e);
                view.status = RequestStatus::Failed;
                view.error = Some(e.to_string());
            }
        });

        if current && next == RequestStatus::Fetching {
            self.poll(&subject_id, generation).await;
        }
    }

    /// Poll until a terminal answer, the poll budget or the timeout.
    async fn poll(&self, subject_id: &SubjectId, generation: u64) {
        let polling = pin!(self.poll_loop(subject_id, generation));
        let deadline = pin!(timer::sleep(self.config.timeout));

        if let Either::Right(_) = future::select(polling, deadline).await {
            tracing::debug!("Polling for {} timed out", subject_id);
            self.apply(generation, |view| {
                if view.status == RequestStatus::Fetching {
                    view.status = RequestStatus::Failed;
                    view.error = Some("timed out waiting for rating".to_string());
                }
            });
        }
    }

    async fn poll_loop(&self, subject_id: &SubjectId, generation: u64) {
        for poll in 1..=self.config.max_polls {
            timer::sleep(self.config.interval).await;
            if !self.is_current(generation) {
                return;
            }

            let result = self.api.get_rating(subject_id).await;

            let mut done = false;
            let current = self.apply(generation, |view| {
                view.polls = poll;
                match result {
                    Ok(response) => {
                        if let Some(next) = RequestStatus::after_poll(response.status) {
                            view.status = next;
                            view.percentage = response.percentage;
                            done = true;
                        }
                    }
                    // Transport errors keep polling
                    Err(e) => view.error = Some(e.to_string()),
                }
            });
            if !current || done {
                return;
            }
        }

        tracing::debug!("Gave up on {} after {} polls", subject_id, self.config.max_polls);
        self.apply(generation, |view| view.status = RequestStatus::Failed);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.borrow().generation == generation
    }

    /// Update the view if `generation` is still current.
    fn apply(&self, generation: u64, update: impl FnOnce(&mut RatingView)) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation {
                return false;
            }
            update(&mut state.view);
        }
        self.notify();
        true
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            let view = self.view();
            listener(&view);
        }
    }
}
