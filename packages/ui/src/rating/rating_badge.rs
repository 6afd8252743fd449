//! Audience rating widget.

use dioxus::prelude::*;
use rating_core::{RequestStatus, SubjectId};

use super::{PollConfig, PollingController, RatingView, ServerRatingApi, StatusBadge};

/// Shows a subject's audience rating, fetching it on mount when needed.
#[component]
pub fn RatingBadge(subject_id: String, #[props(default)] cached: Option<u8>) -> Element {
    let view = use_signal(RatingView::default);

    let controller = use_hook(move || {
        PollingController::new(ServerRatingApi, PollConfig::default()).with_listener(
            move |next: &RatingView| {
                let mut view = view;
                view.set(next.clone());
            },
        )
    });

    // Remount whenever the subject or cached value changes
    let mount_controller = controller.clone();
    use_effect(use_reactive!(|(subject_id, cached)| {
        match SubjectId::parse(&subject_id) {
            Ok(id) => {
                let controller = mount_controller.clone();
                spawn(async move {
                    controller.mount(id, cached).await;
                });
            }
            Err(e) => tracing::warn!("Not mounting rating widget: {}", e),
        }
    }));

    let current = view();
    let label = match (current.status, current.percentage) {
        (RequestStatus::Completed, Some(percentage)) => format!("{}% liked this", percentage),
        (RequestStatus::Pending | RequestStatus::Fetching, _) => "Looking up rating...".to_string(),
        (RequestStatus::LimitReached, _) => "Rating lookups paused".to_string(),
        (RequestStatus::Failed, _) => "No rating yet".to_string(),
        _ => String::new(),
    };
    let can_trigger =
        current.status.accepts_trigger() && current.status != RequestStatus::Completed;

    rsx! {
        div { class: "rating-badge",
            StatusBadge { status: current.status }
            span { class: "rating-label", "{label}" }
            if can_trigger {
                button {
                    class: "btn btn-small",
                    onclick: move |_| {
                        let controller = controller.clone();
                        spawn(async move {
                            controller.trigger().await;
                        });
                    },
                    "Get rating"
                }
            }
        }
    }
}
