//! Message types for actor communication.

use rating_core::{EnrichmentJob, JobOutcome, JobResolution, QueueStatus, SubjectId};
use ractor::RpcReplyPort;

/// Messages for the QueueActor.
#[derive(Debug)]
pub enum QueueMessage {
    /// Add a job unless its subject is already pending or running.
    ///
    /// The optional waiter receives the resolution of the job's next attempt.
    Enqueue {
        job: Box<EnrichmentJob>,
        waiter: Option<RpcReplyPort<JobResolution>>,
    },

    /// Whether the subject is pending, running or awaiting a retry.
    Contains {
        subject_id: SubjectId,
        reply: RpcReplyPort<bool>,
    },

    /// Snapshot of the queue.
    GetStatus { reply: RpcReplyPort<QueueStatus> },

    /// Drop a scheduled retry.
    CancelRetry {
        subject_id: SubjectId,
        reply: RpcReplyPort<bool>,
    },

    /// Select the next pending job and hand it to the worker.
    DrainNext,

    /// Reported by the worker when an attempt finishes.
    JobFinished {
        job: Box<EnrichmentJob>,
        outcome: JobOutcome,
        duration_ms: u64,
    },

    /// A scheduled retry timer fired.
    RetryDue,

    /// Stop the worker and the queue.
    Shutdown,
}

/// Messages for the WorkerActor.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Run one attempt of a job.
    ProcessJob { job: Box<EnrichmentJob> },

    /// Shutdown the worker.
    Shutdown,
}
