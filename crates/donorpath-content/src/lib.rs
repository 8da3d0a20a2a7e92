//! DonorPath — Content Store.
//!
//! Responsible for loading the static story and hotspot catalogs once,
//! validating their structure and scene graphs, and serving read-only
//! lookups to the journey engine.

pub mod application;
pub mod bundled;
pub mod domain;
pub mod error;

pub use application::loader::LoadOptions;
pub use application::store::ContentStore;
pub use domain::models::{Choice, HotspotStory, MapHotspot, Scene, Story};
pub use error::ContentError;
