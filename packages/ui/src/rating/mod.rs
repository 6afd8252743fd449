//! Rating widgets and the client-side request controller.

mod controller;
mod rating_badge;
mod status_badge;

pub use controller::{
    ApiFuture, PollConfig, PollingController, RatingApi, RatingView, ServerRatingApi,
};
pub use rating_badge::RatingBadge;
pub use status_badge::StatusBadge;
