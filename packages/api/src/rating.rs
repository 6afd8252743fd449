//! Rating server functions.

use dioxus::prelude::*;
use rating_core::{QueueStatus, RatingResponse, RequestOrigin};

#[cfg(feature = "server")]
fn parse_subject_id(raw: &str) -> Result<rating_core::SubjectId, ServerFnError> {
    rating_core::SubjectId::parse(raw)
        .map_err(|e| ServerFnError::new(format!("Invalid subject ID: {}", e)))
}

/// Get the current rating for a subject without triggering enrichment.
#[get("/api/rating/:subject_id")]
pub async fn get_rating(subject_id: String) -> Result<RatingResponse, ServerFnError> {
    #[cfg(feature = "server")]
    {
        let subject_id = parse_subject_id(&subject_id)?;
        let service = crate::rating_service().await?;
        Ok(service.read(&subject_id).await)
    }

    #[cfg(not(feature = "server"))]
    {
        let _ = subject_id;
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Request a rating, enqueueing enrichment when none is stored.
///
/// A missing origin is treated as a background request.
#[post("/api/rating/:subject_id")]
pub async fn request_rating(
    subject_id: String,
    origin: Option<RequestOrigin>,
) -> Result<RatingResponse, ServerFnError> {
    #[cfg(feature = "server")]
    {
        let subject_id = parse_subject_id(&subject_id)?;
        let service = crate::rating_service().await?;
        Ok(service
            .request(&subject_id, origin.unwrap_or_default())
            .await)
    }

    #[cfg(not(feature = "server"))]
    {
        let _ = (subject_id, origin);
        Err(ServerFnError::new("Server-only function"))
    }
}

/// Get a snapshot of the enrichment queue.
#[get("/api/enrichment/status")]
pub async fn enrichment_status() -> Result<QueueStatus, ServerFnError> {
    #[cfg(feature = "server")]
    {
        let service = crate::rating_service().await?;
        service
            .queue_status()
            .await
            .map_err(|e| ServerFnError::new(format!("Failed to read queue status: {}", e)))
    }

    #[cfg(not(feature = "server"))]
    {
        Err(ServerFnError::new("Server-only function"))
    }
}
