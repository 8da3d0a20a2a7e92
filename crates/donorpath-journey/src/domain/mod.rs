//! Journey domain: stages, intents, events and the session aggregate.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod scoring;
pub mod stage;
