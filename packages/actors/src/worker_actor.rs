//! Worker actor for executing jobs.
//!
//! The worker runs one attempt at a time so the queue actor stays free to
//! accept messages while the provider call is in progress.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use rating_core::JobOutcome;
use ractor::{Actor, ActorProcessingErr, ActorRef};

use crate::messages::{QueueMessage, WorkerMessage};
use crate::processor::JobProcessor;

/// State for the worker actor.
pub struct WorkerActorState {
    /// Queue actor reference.
    pub queue: ActorRef<QueueMessage>,
    /// Processor for job attempts.
    pub processor: Arc<dyn JobProcessor>,
    /// Upper bound on one attempt.
    pub job_timeout: Duration,
}

/// Worker actor arguments.
pub struct WorkerArgs {
    pub queue: ActorRef<QueueMessage>,
    pub processor: Arc<dyn JobProcessor>,
    pub job_timeout: Duration,
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Worker actor that executes jobs.
pub struct WorkerActor;

impl Actor for WorkerActor {
    type Msg = WorkerMessage;
    type State = WorkerActorState;
    type Arguments = WorkerArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        tracing::info!("Starting enrichment worker");

        Ok(WorkerActorState {
            queue: args.queue,
            processor: args.processor,
            job_timeout: args.job_timeout,
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            WorkerMessage::ProcessJob { job } => {
                let started = tokio::time::Instant::now();

                // Execute with timeout; a panicking processor fails the attempt only
                let attempt =
                    AssertUnwindSafe(async { state.processor.process(&job).await }).catch_unwind();
                let outcome = match tokio::time::timeout(state.job_timeout, attempt).await {
                    Ok(Ok(outcome)) => outcome,
                    Ok(Err(panic)) => {
                        let reason = panic_message(panic.as_ref());
                        tracing::error!(
                            "Job {} for {} panicked: {}",
                            job.id,
                            job.subject_id,
                            reason
                        );
                        JobOutcome::Failed {
                            error: format!("processor panicked: {}", reason),
                        }
                    }
                    Err(_) => {
                        tracing::warn!(
                            "Job {} for {} timed out after {}s",
                            job.id,
                            job.subject_id,
                            state.job_timeout.as_secs()
                        );
                        JobOutcome::Failed {
                            error: format!("timed out after {}s", state.job_timeout.as_secs()),
                        }
                    }
                };

                let duration_ms = started.elapsed().as_millis() as u64;
                state.queue.send_message(QueueMessage::JobFinished {
                    job,
                    outcome,
                    duration_ms,
                })?;
            }

            WorkerMessage::Shutdown => {
                tracing::info!("Shutting down enrichment worker");
                myself.stop(None);
                return Ok(());
            }
        }

        Ok(())
    }
}
