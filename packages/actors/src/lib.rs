//! Actor system for the enrichment queue.
//!
//! This crate provides the Ractor-based queue that deduplicates, orders,
//! paces and retries sentiment enrichment jobs.
//!
//! # Architecture
//!
//! - `QueueActor` - Owns pending jobs, the in-flight job, scheduled retries
//!   and waiters
//! - `WorkerActor` - Runs one job attempt at a time under a timeout
//! - `EnrichmentQueue` - Cloneable handle used by the rest of the system
//!
//! # Usage
//!
//! ```ignore
//! use actors::{SentimentJobProcessor, start_enrichment_queue};
//!
//! let processor = Arc::new(SentimentJobProcessor::new(provider, store));
//! let (queue, _handle) = start_enrichment_queue(QueueConfig::default(), processor).await?;
//!
//! queue.enqueue(EnrichmentJob::for_subject(&subject))?;
//! ```

mod handle;
mod messages;
mod processor;
mod queue_actor;
mod worker_actor;

pub use handle::{EnqueueWait, EnrichmentQueue, QueueError, start_enrichment_queue};
pub use messages::{QueueMessage, WorkerMessage};
pub use processor::{FnProcessor, JobProcessor, ProcessFuture, SentimentJobProcessor};
pub use queue_actor::QueueActor;
pub use worker_actor::WorkerActor;

/// Re-export ractor types for convenience.
pub use ractor::{Actor, ActorRef, RpcReplyPort, concurrency};
