//! Request status badge.

use dioxus::prelude::*;
use rating_core::RequestStatus;

/// Badge for displaying where a rating request stands.
#[component]
pub fn StatusBadge(status: RequestStatus) -> Element {
    let (bg_class, text) = match status {
        RequestStatus::Idle => ("badge-default", "Idle"),
        RequestStatus::Pending => ("badge-pending", "Requesting"),
        RequestStatus::Fetching => ("badge-running", "Fetching"),
        RequestStatus::Completed => ("badge-completed", "Found"),
        RequestStatus::Failed => ("badge-failed", "Not found"),
        RequestStatus::LimitReached => ("badge-paused", "Limit reached"),
    };

    rsx! {
        span {
            class: "status-badge {bg_class}",
            {text}
        }
    }
}
