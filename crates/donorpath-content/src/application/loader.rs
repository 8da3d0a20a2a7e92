//! Parsing, validation, and hashing of the two content documents.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::domain::models::{HotspotsDocument, MapHotspot, StoriesDocument, Story};
use crate::domain::validation::{GraphDefect, check_structure, find_graph_defects};
use crate::error::ContentError;

/// File name of the stories document inside a content directory.
pub const STORIES_FILE: &str = "stories.json";

/// File name of the hotspots document inside a content directory.
pub const HOTSPOTS_FILE: &str = "map-hotspots.json";

/// Controls how strictly a catalog is checked at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject the catalog when any choice points at a missing scene. When
    /// off, defects are logged and surface at runtime instead.
    pub strict_graph: bool,
}

impl LoadOptions {
    /// Rejects dangling choice references.
    #[must_use]
    pub fn strict() -> Self {
        Self { strict_graph: true }
    }

    /// Logs dangling choice references and loads anyway.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            strict_graph: false,
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::strict()
    }
}

/// A parsed and validated catalog.
#[derive(Debug)]
pub(crate) struct Catalog {
    pub stories: Vec<Story>,
    pub hotspots: Vec<MapHotspot>,
    pub version_hash: String,
}

/// Parses both documents and enforces the catalog invariants.
pub(crate) fn parse_catalog(
    stories_json: &str,
    hotspots_json: &str,
    options: LoadOptions,
) -> Result<Catalog, ContentError> {
    let stories: StoriesDocument =
        serde_json::from_str(stories_json).map_err(|source| ContentError::Schema {
            document: "stories",
            source,
        })?;
    let hotspots: HotspotsDocument =
        serde_json::from_str(hotspots_json).map_err(|source| ContentError::Schema {
            document: "hotspots",
            source,
        })?;

    check_structure(&stories.stories, &hotspots.hotspots)?;

    let defects = find_graph_defects(&stories.stories);
    if !defects.is_empty() {
        if options.strict_graph {
            return Err(ContentError::BrokenGraph(defects));
        }
        log_defects(&defects);
    }

    let version_hash = version_hash(stories_json, hotspots_json);
    info!(
        stories = stories.stories.len(),
        hotspots = hotspots.hotspots.len(),
        version_hash = %version_hash,
        "content catalog loaded"
    );

    Ok(Catalog {
        stories: stories.stories,
        hotspots: hotspots.hotspots,
        version_hash,
    })
}

/// Reads both documents from `dir`.
pub(crate) fn read_dir(dir: &Path) -> Result<(String, String), ContentError> {
    let read = |name: &str| {
        let path = dir.join(name);
        std::fs::read_to_string(&path).map_err(|source| ContentError::Io { path, source })
    };
    Ok((read(STORIES_FILE)?, read(HOTSPOTS_FILE)?))
}

fn log_defects(defects: &[GraphDefect]) {
    for defect in defects {
        warn!(
            story_id = %defect.story_id,
            scene_id = %defect.scene_id,
            choice_id = %defect.choice_id,
            next_scene_id = %defect.next_scene_id,
            "choice points at a missing scene"
        );
    }
}

/// SHA-256 over both documents, hex-encoded.
fn version_hash(stories_json: &str, hotspots_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stories_json.as_bytes());
    hasher.update([0u8]);
    hasher.update(hotspots_json.as_bytes());
    format!("{:x}", hasher.finalize())
}
