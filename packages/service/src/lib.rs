//! Rating request orchestration.
//!
//! [`RatingService`] answers rating reads and requests from the store and,
//! when nothing is stored yet, hands the work to the enrichment queue. It
//! never calls the sentiment provider itself.

mod config;
mod error;
mod rating;

pub use config::RatingServiceConfig;
pub use error::ServiceError;
pub use rating::RatingService;
