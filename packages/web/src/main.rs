// Dioxus `rsx!` macro expands to unwraps internally; allow to avoid false positives.
#![allow(clippy::disallowed_methods)]

use dioxus::prelude::*;

use ui::{QueueStatusPanel, RatingBadge};

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Shell)]
        #[route("/")]
        Home {},
        #[route("/subjects/:subject_id")]
        SubjectPage { subject_id: String },
        #[route("/admin/enrichment")]
        Enrichment {},
}

fn main() {
    #[cfg(feature = "server")]
    {
        use tracing_subscriber::EnvFilter;

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        Router::<Route> {}
    }
}

/// Top navigation around every page.
#[component]
fn Shell() -> Element {
    rsx! {
        nav { class: "navbar",
            Link { to: Route::Home {}, "Home" }
            Link { to: Route::Enrichment {}, "Enrichment" }
        }

        main { class: "page-container",
            Outlet::<Route> {}
        }
    }
}

#[component]
fn Home() -> Element {
    let mut subject_id = use_signal(String::new);
    let nav = use_navigator();

    rsx! {
        h1 { "Audience ratings" }
        form {
            onsubmit: move |e| {
                e.prevent_default();
                let id = subject_id().trim().to_string();
                if !id.is_empty() {
                    nav.push(Route::SubjectPage { subject_id: id });
                }
            },
            input {
                placeholder: "Subject ID",
                value: "{subject_id}",
                oninput: move |e| subject_id.set(e.value()),
            }
            button { class: "btn btn-primary", r#type: "submit", "Look up" }
        }
    }
}

/// Rating for a single subject.
#[component]
fn SubjectPage(subject_id: String) -> Element {
    rsx! {
        h1 { "{subject_id}" }
        RatingBadge { subject_id }
    }
}

#[component]
fn Enrichment() -> Element {
    rsx! {
        QueueStatusPanel {}
    }
}
