//! Server API functions for audience sentiment ratings.
//!
//! This crate contains the shared fullstack server functions for:
//! - Reading a subject's rating
//! - Requesting enrichment for a subject
//! - The enrichment queue snapshot

mod rating;

#[cfg(feature = "server")]
mod init;

// Re-export all server functions
pub use rating::*;

#[cfg(feature = "server")]
pub use init::*;

// Re-export core types for convenience
pub use rating_core::{
    QueueStatus, RatingResponse, RatingStatus, RequestOrigin, RequestStatus, SubjectId,
};
