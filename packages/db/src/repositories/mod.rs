//! Repository implementations for database operations.

mod provider_call_repo;
mod sentiment_repo;
mod subject_repo;

pub use provider_call_repo::{CallUsage, ProviderCallRepository};
pub use sentiment_repo::SentimentRepository;
pub use subject_repo::SubjectRepository;
