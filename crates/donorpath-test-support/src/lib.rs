//! Shared test mocks, doubles, and content fixtures for DonorPath.

mod clock;
pub mod fixtures;
mod repository;
mod rng;
mod sink;

pub use clock::{FixedClock, ManualClock, fixed_now};
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
pub use rng::{MockRng, SequenceRng};
pub use sink::{FailingSink, RecordingSink, StallingSink};
