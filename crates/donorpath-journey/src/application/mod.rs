//! Application services for journeys.

pub mod command_handlers;
pub mod query_handlers;
