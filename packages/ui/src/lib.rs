//! This crate contains all shared UI for the workspace.

// Dioxus `rsx!` macro expands to unwraps internally; allow to avoid false positives.
#![allow(clippy::disallowed_methods)]

mod timer;

mod queue_panel;
pub use queue_panel::QueueStatusPanel;

pub mod rating;
pub use rating::RatingBadge;
