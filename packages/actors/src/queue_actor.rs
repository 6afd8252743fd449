//! Queue actor owning the enrichment queue state.
//!
//! All state lives here and is only touched from the actor's message loop:
//! pending jobs keyed by subject, the single in-flight job, the drain flag,
//! scheduled retries and waiters for job resolutions.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use rating_core::{
    EnrichmentEvent, EnrichmentJob, JobOutcome, JobResolution, QueueConfig, QueueStatus,
    QueuedJobSummary, ScheduledRetrySummary, SubjectId,
};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort, SupervisionEvent};
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::messages::{QueueMessage, WorkerMessage};
use crate::processor::JobProcessor;
use crate::worker_actor::{WorkerActor, WorkerArgs};

/// A pending job with its insertion sequence.
#[derive(Debug, Clone)]
struct PendingJob {
    job: EnrichmentJob,
    seq: u64,
}

impl PendingJob {
    fn sort_key(&self) -> (u8, u64) {
        (self.job.priority.rank(), self.seq)
    }
}

/// A job waiting for its retry timer, ordered by due time.
#[derive(Debug, Clone)]
struct ScheduledRetry {
    due: Instant,
    seq: u64,
    job: EnrichmentJob,
}

impl PartialEq for ScheduledRetry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledRetry {}

impl PartialOrd for ScheduledRetry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledRetry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier due first, then scheduling order
        match self.due.cmp(&other.due) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            other => other,
        }
    }
}

/// State for the queue actor.
pub struct QueueActorState {
    config: QueueConfig,
    pending: HashMap<SubjectId, PendingJob>,
    in_flight: Option<EnrichmentJob>,
    draining: bool,
    retries: BinaryHeap<Reverse<ScheduledRetry>>,
    waiters: HashMap<SubjectId, Vec<RpcReplyPort<JobResolution>>>,
    next_seq: u64,
    worker: Option<ActorRef<WorkerMessage>>,
    event_tx: broadcast::Sender<EnrichmentEvent>,
}

impl QueueActorState {
    fn new(config: QueueConfig, event_tx: broadcast::Sender<EnrichmentEvent>) -> Self {
        Self {
            config,
            pending: HashMap::new(),
            in_flight: None,
            draining: false,
            retries: BinaryHeap::new(),
            waiters: HashMap::new(),
            next_seq: 0,
            worker: None,
            event_tx,
        }
    }

    /// Broadcast an event.
    fn broadcast(&self, event: EnrichmentEvent) {
        tracing::debug!("{}", event.description());
        let _ = self.event_tx.send(event);
    }

    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn is_in_flight(&self, subject_id: &SubjectId) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|job| &job.subject_id == subject_id)
    }

    fn has_retry(&self, subject_id: &SubjectId) -> bool {
        self.retries
            .iter()
            .any(|Reverse(retry)| &retry.job.subject_id == subject_id)
    }

    fn contains(&self, subject_id: &SubjectId) -> bool {
        self.pending.contains_key(subject_id)
            || self.is_in_flight(subject_id)
            || self.has_retry(subject_id)
    }

    fn add_waiter(&mut self, subject_id: &SubjectId, waiter: Option<RpcReplyPort<JobResolution>>) {
        if let Some(waiter) = waiter {
            self.waiters
                .entry(subject_id.clone())
                .or_default()
                .push(waiter);
        }
    }

    fn resolve_waiters(&mut self, resolution: &JobResolution) {
        if let Some(waiters) = self.waiters.remove(&resolution.subject_id) {
            for waiter in waiters {
                // The caller may have stopped waiting
                let _ = waiter.send(resolution.clone());
            }
        }
    }

    fn remove_retry(&mut self, subject_id: &SubjectId) -> bool {
        let before = self.retries.len();
        self.retries
            .retain(|Reverse(retry)| &retry.job.subject_id != subject_id);
        self.retries.len() != before
    }

    fn insert_pending(&mut self, job: EnrichmentJob) {
        let seq = self.next_seq();
        self.pending
            .insert(job.subject_id.clone(), PendingJob { job, seq });
    }

    /// Pending job with the lowest priority rank, oldest first among equals.
    fn take_next(&mut self) -> Option<EnrichmentJob> {
        let subject_id = self
            .pending
            .values()
            .min_by_key(|p| p.sort_key())
            .map(|p| p.job.subject_id.clone())?;
        self.pending.remove(&subject_id).map(|p| p.job)
    }

    fn start_drain(&mut self, myself: &ActorRef<QueueMessage>) -> Result<(), ActorProcessingErr> {
        if self.draining {
            return Ok(());
        }
        self.draining = true;
        self.broadcast(EnrichmentEvent::DrainStarted {
            timestamp: Utc::now(),
        });
        myself.send_message(QueueMessage::DrainNext)?;
        Ok(())
    }

    fn status(&self) -> QueueStatus {
        let mut pending: Vec<&PendingJob> = self.pending.values().collect();
        pending.sort_by_key(|p| p.sort_key());

        let now = Instant::now();
        let mut retries: Vec<&ScheduledRetry> =
            self.retries.iter().map(|Reverse(retry)| retry).collect();
        retries.sort();

        QueueStatus {
            queued_count: self.pending.len(),
            in_flight_count: usize::from(self.in_flight.is_some()),
            is_draining: self.draining,
            queued_jobs: pending
                .into_iter()
                .map(|p| QueuedJobSummary::from(&p.job))
                .collect(),
            scheduled_retries: retries
                .into_iter()
                .map(|retry| ScheduledRetrySummary {
                    subject_id: retry.job.subject_id.clone(),
                    display_title: retry.job.display_title.clone(),
                    attempt_count: retry.job.attempt_count,
                    due_in_secs: retry.due.saturating_duration_since(now).as_secs(),
                })
                .collect(),
        }
    }
}

/// Queue actor arguments.
pub struct QueueActorArgs {
    pub config: QueueConfig,
    pub processor: Arc<dyn JobProcessor>,
    pub event_tx: broadcast::Sender<EnrichmentEvent>,
}

/// Queue actor that deduplicates, orders, paces and retries enrichment jobs.
pub struct QueueActor;

impl QueueActor {
    fn handle_enqueue(
        myself: &ActorRef<QueueMessage>,
        state: &mut QueueActorState,
        job: EnrichmentJob,
        waiter: Option<RpcReplyPort<JobResolution>>,
    ) -> Result<(), ActorProcessingErr> {
        let subject_id = job.subject_id.clone();

        if state.pending.contains_key(&subject_id) || state.is_in_flight(&subject_id) {
            state.add_waiter(&subject_id, waiter);
            state.broadcast(EnrichmentEvent::JobDeduplicated {
                subject_id,
                timestamp: Utc::now(),
            });
            return Ok(());
        }

        // A fresh job supersedes any scheduled retry
        if state.remove_retry(&subject_id) {
            state.broadcast(EnrichmentEvent::RetryCancelled {
                subject_id: subject_id.clone(),
                timestamp: Utc::now(),
            });
        }

        state.add_waiter(&subject_id, waiter);
        state.broadcast(EnrichmentEvent::JobEnqueued {
            job: job.clone(),
            timestamp: Utc::now(),
        });
        state.insert_pending(job);
        state.start_drain(myself)
    }

    fn handle_drain_next(state: &mut QueueActorState) -> Result<(), ActorProcessingErr> {
        if state.in_flight.is_some() {
            return Ok(());
        }

        let Some(mut job) = state.take_next() else {
            state.draining = false;
            state.broadcast(EnrichmentEvent::DrainIdle {
                timestamp: Utc::now(),
            });
            return Ok(());
        };

        let now = Utc::now();
        job.begin_attempt(now);
        state.in_flight = Some(job.clone());

        state.broadcast(EnrichmentEvent::JobStarted {
            job_id: job.id,
            subject_id: job.subject_id.clone(),
            attempt: job.attempt_count,
            timestamp: now,
        });

        let Some(worker) = state.worker.as_ref() else {
            return Err(ActorProcessingErr::from("Enrichment worker is not running"));
        };
        worker.send_message(WorkerMessage::ProcessJob { job: Box::new(job) })?;
        Ok(())
    }

    fn handle_job_finished(
        myself: &ActorRef<QueueMessage>,
        state: &mut QueueActorState,
        job: EnrichmentJob,
        outcome: JobOutcome,
        duration_ms: u64,
    ) {
        state.in_flight = None;
        let now = Utc::now();

        match &outcome {
            JobOutcome::Stored { percentage } | JobOutcome::AlreadyPresent { percentage } => {
                tracing::info!(
                    "Sentiment for {} resolved: {}% ({})",
                    job.subject_id,
                    percentage,
                    outcome.as_str()
                );
            }
            JobOutcome::NoData => {
                tracing::info!(
                    "No sentiment for {} (attempt {})",
                    job.subject_id,
                    job.attempt_count
                );
            }
            JobOutcome::Failed { error } => {
                tracing::warn!(
                    "Enrichment of {} failed (attempt {}): {}",
                    job.subject_id,
                    job.attempt_count,
                    error
                );
            }
            JobOutcome::Skipped => {
                tracing::info!("Enrichment of {} skipped", job.subject_id);
            }
        }

        state.broadcast(EnrichmentEvent::JobFinished {
            job_id: job.id,
            subject_id: job.subject_id.clone(),
            outcome: outcome.clone(),
            duration_ms,
            timestamp: now,
        });

        let retry_delay = state.config.retry_delay(&job, &outcome);
        let resolution = JobResolution {
            subject_id: job.subject_id.clone(),
            outcome: outcome.clone(),
            retry_in_secs: retry_delay.map(|d| d.as_secs()),
        };

        match retry_delay {
            Some(delay) => {
                state.broadcast(EnrichmentEvent::RetryScheduled {
                    job_id: job.id,
                    subject_id: job.subject_id.clone(),
                    attempt: job.attempt_count,
                    delay_secs: delay.as_secs(),
                    timestamp: now,
                });

                let seq = state.next_seq();
                state.retries.push(Reverse(ScheduledRetry {
                    due: Instant::now() + delay,
                    seq,
                    job,
                }));

                let myself = myself.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = myself.send_message(QueueMessage::RetryDue);
                });
            }
            None if outcome.is_retryable() => {
                tracing::info!(
                    "Dropping {} after {} attempts",
                    job.subject_id,
                    job.attempt_count
                );
                state.broadcast(EnrichmentEvent::JobDropped {
                    job_id: job.id,
                    subject_id: job.subject_id.clone(),
                    attempts: job.attempt_count,
                    timestamp: now,
                });
            }
            None => {}
        }

        state.resolve_waiters(&resolution);

        // Pace before selecting the next job
        let pacing = state.config.pacing();
        let myself = myself.clone();
        tokio::spawn(async move {
            tokio::time::sleep(pacing).await;
            let _ = myself.send_message(QueueMessage::DrainNext);
        });
    }

    fn handle_retry_due(
        myself: &ActorRef<QueueMessage>,
        state: &mut QueueActorState,
    ) -> Result<(), ActorProcessingErr> {
        let now = Instant::now();
        let mut requeued = false;

        while state
            .retries
            .peek()
            .is_some_and(|Reverse(retry)| retry.due <= now)
        {
            let Some(Reverse(retry)) = state.retries.pop() else {
                break;
            };
            let subject_id = retry.job.subject_id.clone();

            if state.pending.contains_key(&subject_id) || state.is_in_flight(&subject_id) {
                continue;
            }

            tracing::debug!(
                "Retry due for {} (attempt {} next)",
                subject_id,
                retry.job.attempt_count + 1
            );
            state.broadcast(EnrichmentEvent::JobEnqueued {
                job: retry.job.clone(),
                timestamp: Utc::now(),
            });
            state.insert_pending(retry.job);
            requeued = true;
        }

        if requeued {
            state.start_drain(myself)?;
        }
        Ok(())
    }
}

impl Actor for QueueActor {
    type Msg = QueueMessage;
    type State = QueueActorState;
    type Arguments = QueueActorArgs;

    async fn pre_start(
        &self,
        myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!(
            "Starting enrichment queue (pacing {}ms, max {} attempts)",
            args.config.pacing_ms,
            args.config.max_attempts
        );

        let worker_args = WorkerArgs {
            queue: myself.clone(),
            processor: args.processor,
            job_timeout: args.config.job_timeout(),
        };
        let (worker, _handle) =
            Actor::spawn_linked(None, WorkerActor, worker_args, myself.get_cell())
                .await
                .map_err(|e| ActorProcessingErr::from(format!("Failed to spawn worker: {}", e)))?;

        let mut state = QueueActorState::new(args.config, args.event_tx);
        state.worker = Some(worker);
        Ok(state)
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            QueueMessage::Enqueue { job, waiter } => {
                Self::handle_enqueue(&myself, state, *job, waiter)?;
            }

            QueueMessage::Contains { subject_id, reply } => {
                let _ = reply.send(state.contains(&subject_id));
            }

            QueueMessage::GetStatus { reply } => {
                let _ = reply.send(state.status());
            }

            QueueMessage::CancelRetry { subject_id, reply } => {
                let removed = state.remove_retry(&subject_id);
                if removed {
                    state.broadcast(EnrichmentEvent::RetryCancelled {
                        subject_id,
                        timestamp: Utc::now(),
                    });
                }
                let _ = reply.send(removed);
            }

            QueueMessage::DrainNext => {
                Self::handle_drain_next(state)?;
            }

            QueueMessage::JobFinished {
                job,
                outcome,
                duration_ms,
            } => {
                Self::handle_job_finished(&myself, state, *job, outcome, duration_ms);
            }

            QueueMessage::RetryDue => {
                Self::handle_retry_due(&myself, state)?;
            }

            QueueMessage::Shutdown => {
                tracing::info!(
                    "Shutting down enrichment queue ({} pending, {} scheduled retries)",
                    state.pending.len(),
                    state.retries.len()
                );
                if let Some(worker) = state.worker.take() {
                    let _ = worker.send_message(WorkerMessage::Shutdown);
                }
                myself.stop(None);
                return Ok(());
            }
        }

        Ok(())
    }

    async fn handle_supervisor_evt(
        &self,
        myself: ActorRef<Self::Msg>,
        message: SupervisionEvent,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            SupervisionEvent::ActorTerminated(cell, _, reason) => {
                tracing::info!(
                    "Enrichment worker {} terminated: {:?}",
                    cell.get_id(),
                    reason
                );
            }
            SupervisionEvent::ActorFailed(cell, err) => {
                // Without a worker nothing can drain
                tracing::error!("Enrichment worker {} failed: {}", cell.get_id(), err);
                state.worker = None;
                myself.stop(Some("enrichment worker failed".to_string()));
            }
            _ => {}
        }
        Ok(())
    }
}
