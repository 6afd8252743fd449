//! Public handle to the enrichment queue.

use std::sync::Arc;
use std::time::Duration;

use rating_core::{
    EnrichmentEvent, EnrichmentJob, JobResolution, QueueConfig, QueueStatus, SubjectId,
};
use ractor::rpc::CallResult;
use ractor::{Actor, ActorRef};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::messages::QueueMessage;
use crate::processor::JobProcessor;
use crate::queue_actor::{QueueActor, QueueActorArgs};

/// Timeout for read-only queries against the queue actor.
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Error type for queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Failed to start enrichment queue: {0}")]
    Spawn(String),

    #[error("Enrichment queue unavailable: {0}")]
    Messaging(String),

    #[error("Timeout")]
    Timeout,
}

/// Result of [`EnrichmentQueue::enqueue_and_wait`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueWait {
    /// The job's attempt finished within the wait window.
    Resolved(JobResolution),
    /// The job is still pending or running.
    StillQueued,
}

/// Handle to the enrichment queue actor. Cheap to clone.
#[derive(Clone)]
pub struct EnrichmentQueue {
    actor: ActorRef<QueueMessage>,
    events: broadcast::Sender<EnrichmentEvent>,
}

impl EnrichmentQueue {
    /// Enqueue a job without waiting for it.
    ///
    /// A job for a subject that is already pending or running is ignored.
    pub fn enqueue(&self, job: EnrichmentJob) -> Result<(), QueueError> {
        self.actor
            .send_message(QueueMessage::Enqueue {
                job: Box::new(job),
                waiter: None,
            })
            .map_err(|e| QueueError::Messaging(e.to_string()))
    }

    /// Enqueue a job and wait up to `wait` for its next attempt to resolve.
    pub async fn enqueue_and_wait(
        &self,
        job: EnrichmentJob,
        wait: Duration,
    ) -> Result<EnqueueWait, QueueError> {
        let result = ractor::rpc::call(
            &self.actor,
            |reply| QueueMessage::Enqueue {
                job: Box::new(job),
                waiter: Some(reply),
            },
            Some(wait),
        )
        .await
        .map_err(|e| QueueError::Messaging(e.to_string()))?;

        match result {
            CallResult::Success(resolution) => Ok(EnqueueWait::Resolved(resolution)),
            CallResult::Timeout => Ok(EnqueueWait::StillQueued),
            CallResult::SenderError => Err(QueueError::Messaging(
                "queue stopped before the job resolved".into(),
            )),
        }
    }

    /// Whether the subject is pending, running or awaiting a retry.
    pub async fn contains(&self, subject_id: &SubjectId) -> Result<bool, QueueError> {
        let subject_id = subject_id.clone();
        self.query(|reply| QueueMessage::Contains { subject_id, reply })
            .await
    }

    /// Snapshot of the queue.
    pub async fn status(&self) -> Result<QueueStatus, QueueError> {
        self.query(|reply| QueueMessage::GetStatus { reply }).await
    }

    /// Cancel a scheduled retry. Returns whether one existed.
    pub async fn cancel_retry(&self, subject_id: &SubjectId) -> Result<bool, QueueError> {
        let subject_id = subject_id.clone();
        self.query(|reply| QueueMessage::CancelRetry { subject_id, reply })
            .await
    }

    /// Subscribe to queue events.
    pub fn subscribe(&self) -> broadcast::Receiver<EnrichmentEvent> {
        self.events.subscribe()
    }

    /// Stop the worker and the queue. Scheduled retries are lost.
    pub fn shutdown(&self) {
        let _ = self.actor.send_message(QueueMessage::Shutdown);
    }

    async fn query<T, F>(&self, msg: F) -> Result<T, QueueError>
    where
        T: Send + 'static,
        F: FnOnce(ractor::RpcReplyPort<T>) -> QueueMessage,
    {
        // ractor::rpc::call returns Result<CallResult<T>, MessagingErr<M>>
        let result = ractor::rpc::call(&self.actor, msg, Some(QUERY_TIMEOUT))
            .await
            .map_err(|e| QueueError::Messaging(e.to_string()))?;

        match result {
            CallResult::Success(value) => Ok(value),
            CallResult::Timeout => Err(QueueError::Timeout),
            CallResult::SenderError => Err(QueueError::Messaging("reply dropped".into())),
        }
    }
}

/// Start the enrichment queue and its worker.
pub async fn start_enrichment_queue(
    config: QueueConfig,
    processor: Arc<dyn JobProcessor>,
) -> Result<(EnrichmentQueue, tokio::task::JoinHandle<()>), QueueError> {
    let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

    let args = QueueActorArgs {
        config,
        processor,
        event_tx: event_tx.clone(),
    };

    let (actor, handle) = Actor::spawn(None, QueueActor, args)
        .await
        .map_err(|e| QueueError::Spawn(e.to_string()))?;

    Ok((
        EnrichmentQueue {
            actor,
            events: event_tx,
        },
        handle,
    ))
}
