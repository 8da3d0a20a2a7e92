//! DonorPath — Impact Estimator.
//!
//! Maps a donation amount to what it funds, phrases that for the donor, and
//! builds the outbound link to the external donation provider.

pub mod estimator;
pub mod handoff;
pub mod message;

pub use estimator::{ImpactEstimate, ImpactTier, PRESET_AMOUNTS, estimate};
pub use handoff::{DEFAULT_DONATE_URL, DonationHandoff, parse_web_url};
pub use message::personalized_message;
