//! DonorPath — Journey State Machine.
//!
//! A donor's walk through the experience is an event-sourced
//! [`domain::aggregates::JourneySession`]. The application layer loads,
//! executes and persists it; the presentation layer turns the current scene
//! into a view and debounces choice clicks into intents.

pub mod application;
pub mod domain;
pub mod presentation;
