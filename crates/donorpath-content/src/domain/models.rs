//! Catalog models: stories, scenes, choices, and map hotspots.
//!
//! Field names serialize in camelCase to match the content documents.

use serde::{Deserialize, Serialize};

/// A directed edge in a story's scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Identifier, unique within its scene.
    pub id: String,
    /// Button text shown to the reader.
    pub text: String,
    /// The scene this choice leads to, within the same story.
    pub next_scene_id: String,
    /// Optional one-line impact note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// One narrative beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Identifier, unique within its story.
    pub id: String,
    /// Scene heading.
    pub title: String,
    /// Narrative text.
    pub content: String,
    /// Illustration path or URL.
    pub image_url: String,
    /// Outgoing edges. Empty exactly when `is_ending` is set.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Whether this scene concludes the story.
    #[serde(default)]
    pub is_ending: bool,
}

impl Scene {
    /// Finds one of this scene's choices by id.
    #[must_use]
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

/// A branching narrative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Catalog-wide identifier.
    pub id: String,
    /// Story title.
    pub title: String,
    /// Short teaser.
    pub description: String,
    /// Ordered scenes; the first one is the entry point.
    pub scenes: Vec<Scene>,
}

impl Story {
    /// The scene a reader starts on.
    #[must_use]
    pub fn entry_scene(&self) -> Option<&Scene> {
        self.scenes.first()
    }

    /// Finds a scene of this story by id.
    #[must_use]
    pub fn scene(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == scene_id)
    }

    /// Position of a scene within `scenes`.
    #[must_use]
    pub fn scene_index(&self, scene_id: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == scene_id)
    }
}

/// The vignette attached to a map hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotStory {
    /// Vignette title.
    pub title: String,
    /// Vignette text.
    pub content: String,
    /// Illustration path or URL.
    pub image_url: String,
    /// The student the vignette is about.
    pub student_name: String,
    /// What support achieves in this region.
    pub impact: String,
}

/// A map location bound to a vignette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapHotspot {
    /// Catalog-wide identifier.
    pub id: String,
    /// Region name.
    pub name: String,
    /// `[latitude, longitude]`.
    pub coordinates: [f64; 2],
    /// The vignette shown for this location.
    pub story: HotspotStory,
    /// Explicit binding to a full interactive story.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_id: Option<String>,
}

/// Top-level shape of the stories document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoriesDocument {
    /// All stories in catalog order.
    pub stories: Vec<Story>,
}

/// Top-level shape of the hotspots document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotsDocument {
    /// All hotspots in catalog order.
    pub hotspots: Vec<MapHotspot>,
}
