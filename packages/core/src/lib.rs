//! Core domain types for the sentiment enrichment pipeline.
//!
//! This crate contains shared types used across all packages:
//! - Subject and SentimentRecord for catalog data
//! - EnrichmentJob and Priority for queued work
//! - QueueConfig and QueueStatus for the enrichment queue
//! - RatingResponse and RequestStatus for the request boundary and clients
//! - Events for real-time updates

mod events;
mod job;
mod queue;
mod rating;
mod sentiment;
mod subject;

pub use events::EnrichmentEvent;
pub use job::{EnrichmentJob, JobId, JobOutcome, JobResolution, Priority};
pub use queue::{QueueConfig, QueueStatus, QueuedJobSummary, ScheduledRetrySummary};
pub use rating::{RatingResponse, RatingStatus, RequestOrigin, RequestStatus};
pub use sentiment::{ProviderCall, SentimentRecord};
pub use subject::{InvalidSubjectId, Subject, SubjectId, SubjectKind};
