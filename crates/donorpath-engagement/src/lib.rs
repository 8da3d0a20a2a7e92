//! DonorPath — Engagement Tracker.
//!
//! Records what a visitor does during a journey as an append-only log and
//! forwards each record to an analytics sink without ever making the
//! journey wait on, or fail because of, that sink.

pub mod analytics;
pub mod delivery;
pub mod sinks;
pub mod tracker;

pub use analytics::{ConversionFunnel, JourneyAnalytics};
pub use delivery::Delivery;
pub use sinks::{HttpSink, LogSink};
pub use tracker::EngagementTracker;
