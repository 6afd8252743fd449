use actors::QueueError;
use db::DbError;
use thiserror::Error;

/// Service errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}
