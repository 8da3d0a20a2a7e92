//! Structural and graph validation for loaded catalogs.

use std::collections::HashSet;

use donorpath_core::error::DomainError;
use serde::Serialize;

use super::models::{MapHotspot, Story};
use crate::error::ContentError;

/// A choice whose `next_scene_id` does not resolve within its story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDefect {
    /// The story containing the edge.
    pub story_id: String,
    /// The scene the edge leaves from.
    pub scene_id: String,
    /// The dangling choice.
    pub choice_id: String,
    /// The missing target.
    pub next_scene_id: String,
}

impl From<GraphDefect> for DomainError {
    fn from(defect: GraphDefect) -> Self {
        DomainError::BrokenContentGraph {
            story_id: defect.story_id,
            scene_id: defect.scene_id,
            next_scene_id: defect.next_scene_id,
        }
    }
}

/// Checks the invariants every loaded catalog must satisfy, independent of
/// edge resolution.
///
/// # Errors
///
/// Returns `ContentError::Invalid` describing the first violation found.
pub fn check_structure(stories: &[Story], hotspots: &[MapHotspot]) -> Result<(), ContentError> {
    if stories.is_empty() {
        return Err(ContentError::Invalid("catalog has no stories".to_owned()));
    }

    let mut story_ids = HashSet::new();
    for story in stories {
        if !story_ids.insert(story.id.as_str()) {
            return Err(ContentError::Invalid(format!(
                "duplicate story id {}",
                story.id
            )));
        }
        if story.scenes.is_empty() {
            return Err(ContentError::Invalid(format!(
                "story {} has no scenes",
                story.id
            )));
        }

        let mut scene_ids = HashSet::new();
        for scene in &story.scenes {
            if !scene_ids.insert(scene.id.as_str()) {
                return Err(ContentError::Invalid(format!(
                    "story {} has duplicate scene id {}",
                    story.id, scene.id
                )));
            }
            match (scene.is_ending, scene.choices.is_empty()) {
                (true, false) => {
                    return Err(ContentError::Invalid(format!(
                        "ending scene {} in story {} has choices",
                        scene.id, story.id
                    )));
                }
                (false, true) => {
                    return Err(ContentError::Invalid(format!(
                        "scene {} in story {} has no choices and is not an ending",
                        scene.id, story.id
                    )));
                }
                _ => {}
            }
        }
    }

    let mut hotspot_ids = HashSet::new();
    for hotspot in hotspots {
        if !hotspot_ids.insert(hotspot.id.as_str()) {
            return Err(ContentError::Invalid(format!(
                "duplicate hotspot id {}",
                hotspot.id
            )));
        }
        if let Some(story_id) = &hotspot.story_id {
            if !story_ids.contains(story_id.as_str()) {
                return Err(ContentError::Invalid(format!(
                    "hotspot {} is bound to unknown story {story_id}",
                    hotspot.id
                )));
            }
        }
    }

    Ok(())
}

/// Lists every choice whose target scene is missing from its story.
#[must_use]
pub fn find_graph_defects(stories: &[Story]) -> Vec<GraphDefect> {
    let mut defects = Vec::new();
    for story in stories {
        for scene in &story.scenes {
            for choice in &scene.choices {
                if story.scene(&choice.next_scene_id).is_none() {
                    defects.push(GraphDefect {
                        story_id: story.id.clone(),
                        scene_id: scene.id.clone(),
                        choice_id: choice.id.clone(),
                        next_scene_id: choice.next_scene_id.clone(),
                    });
                }
            }
        }
    }
    defects
}
