//! Content compiled into the binary.

/// The default stories document.
pub const STORIES_JSON: &str = include_str!("../../../content/stories.json");

/// The default map hotspots document.
pub const HOTSPOTS_JSON: &str = include_str!("../../../content/map-hotspots.json");
