//! Enrichment queue diagnostics panel.

use std::time::Duration;

use dioxus::prelude::*;
use rating_core::QueueStatus;

use crate::timer;

const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Live view of pending jobs and scheduled retries.
#[component]
pub fn QueueStatusPanel() -> Element {
    let mut status = use_signal(|| None::<QueueStatus>);
    let mut error = use_signal(|| None::<String>);

    let _refresh = use_coroutine(move |_rx: UnboundedReceiver<()>| async move {
        loop {
            match api::enrichment_status().await {
                Ok(s) => {
                    status.set(Some(s));
                    error.set(None);
                }
                Err(e) => error.set(Some(format!("Failed to load queue status: {}", e))),
            }

            timer::sleep(REFRESH_INTERVAL).await;
        }
    });

    rsx! {
        section { class: "queue-panel",
            h2 { "Enrichment queue" }

            if let Some(err) = error() {
                div { class: "error-banner", span { "{err}" } }
            }

            match status() {
                None => rsx! { p { class: "loading", "Loading..." } },
                Some(status) => rsx! {
                    div { class: "queue-stats",
                        span { "Queued: {status.queued_count}" }
                        span { "In flight: {status.in_flight_count}" }
                        if status.is_draining {
                            span { class: "badge-running", "Draining" }
                        }
                    }

                    if status.queued_jobs.is_empty() {
                        p { class: "empty", "No pending jobs" }
                    } else {
                        table { class: "job-table",
                            thead {
                                tr {
                                    th { "Subject" }
                                    th { "Priority" }
                                    th { "Attempts" }
                                }
                            }
                            tbody {
                                for job in status.queued_jobs.iter() {
                                    tr { key: "{job.subject_id}",
                                        td { "{job.display_title}" }
                                        td { "{job.priority}" }
                                        td { "{job.attempt_count}" }
                                    }
                                }
                            }
                        }
                    }

                    if !status.scheduled_retries.is_empty() {
                        h3 { "Scheduled retries" }
                        ul { class: "retry-list",
                            for retry in status.scheduled_retries.iter() {
                                li { key: "{retry.subject_id}",
                                    "{retry.display_title} (attempt {retry.attempt_count}) in {retry.due_in_secs}s"
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}
