//! The read-only content catalog shared by every journey.

use std::path::Path;

use donorpath_core::error::DomainError;

use super::loader::{LoadOptions, parse_catalog, read_dir};
use crate::bundled;
use crate::domain::models::{MapHotspot, Scene, Story};
use crate::domain::validation::{GraphDefect, find_graph_defects};
use crate::error::ContentError;

/// Immutable catalog of stories and map hotspots, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ContentStore {
    stories: Vec<Story>,
    hotspots: Vec<MapHotspot>,
    version_hash: String,
}

impl ContentStore {
    /// Loads a catalog from the two JSON documents.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Schema` if either document does not match the
    /// schema, `ContentError::Invalid` on a structural violation, and
    /// `ContentError::BrokenGraph` on dangling choices when
    /// `options.strict_graph` is set.
    pub fn from_json(
        stories_json: &str,
        hotspots_json: &str,
        options: LoadOptions,
    ) -> Result<Self, ContentError> {
        let catalog = parse_catalog(stories_json, hotspots_json, options)?;
        Ok(Self {
            stories: catalog.stories,
            hotspots: catalog.hotspots,
            version_hash: catalog.version_hash,
        })
    }

    /// Loads `stories.json` and `map-hotspots.json` from a directory.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Io` if either file cannot be read, otherwise
    /// the same errors as [`ContentStore::from_json`].
    pub fn from_dir(dir: &Path, options: LoadOptions) -> Result<Self, ContentError> {
        let (stories, hotspots) = read_dir(dir)?;
        Self::from_json(&stories, &hotspots, options)
    }

    /// Loads the catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`ContentStore::from_json`].
    pub fn bundled(options: LoadOptions) -> Result<Self, ContentError> {
        Self::from_json(bundled::STORIES_JSON, bundled::HOTSPOTS_JSON, options)
    }

    /// Looks up a story by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no story has that id.
    pub fn get_story_by_id(&self, story_id: &str) -> Result<&Story, DomainError> {
        self.stories
            .iter()
            .find(|s| s.id == story_id)
            .ok_or_else(|| DomainError::not_found("story", story_id))
    }

    /// All stories in catalog order.
    #[must_use]
    pub fn list_stories(&self) -> &[Story] {
        &self.stories
    }

    /// All hotspots in catalog order.
    #[must_use]
    pub fn list_hotspots(&self) -> &[MapHotspot] {
        &self.hotspots
    }

    /// Looks up a hotspot by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if no hotspot has that id.
    pub fn get_hotspot_by_id(&self, hotspot_id: &str) -> Result<&MapHotspot, DomainError> {
        self.hotspots
            .iter()
            .find(|h| h.id == hotspot_id)
            .ok_or_else(|| DomainError::not_found("hotspot", hotspot_id))
    }

    /// Looks up a scene inside a story.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the story has no such scene.
    pub fn find_scene_in_story<'a>(
        &self,
        story: &'a Story,
        scene_id: &str,
    ) -> Result<&'a Scene, DomainError> {
        story
            .scene(scene_id)
            .ok_or_else(|| DomainError::not_found("scene", scene_id))
    }

    /// The full story a hotspot leads into: its explicit binding if it has
    /// one, else the first story whose title mentions the hotspot's name,
    /// else the first story in the catalog.
    #[must_use]
    pub fn story_for_hotspot(&self, hotspot: &MapHotspot) -> &Story {
        if let Some(story) = hotspot
            .story_id
            .as_deref()
            .and_then(|id| self.get_story_by_id(id).ok())
        {
            return story;
        }

        let name = hotspot.name.to_lowercase();
        self.stories
            .iter()
            .find(|s| s.title.to_lowercase().contains(&name))
            .unwrap_or(&self.stories[0])
    }

    /// Every dangling choice reference in the catalog.
    #[must_use]
    pub fn audit_graph(&self) -> Vec<GraphDefect> {
        find_graph_defects(&self.stories)
    }

    /// Hex SHA-256 of the source documents.
    #[must_use]
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled_store() -> ContentStore {
        ContentStore::bundled(LoadOptions::strict()).unwrap()
    }

    #[test]
    fn test_bundled_content_has_intact_graph() {
        // Arrange
        let store = bundled_store();

        // Act
        let defects = store.audit_graph();

        // Assert
        assert!(defects.is_empty(), "dangling edges: {defects:?}");
        for story in store.list_stories() {
            for scene in &story.scenes {
                for choice in &scene.choices {
                    assert!(
                        store
                            .find_scene_in_story(story, &choice.next_scene_id)
                            .is_ok()
                    );
                }
            }
        }
    }

    #[test]
    fn test_bundled_content_has_reachable_ending_per_story() {
        let store = bundled_store();

        for story in store.list_stories() {
            assert!(story.entry_scene().is_some());
            assert!(story.scenes.iter().any(|s| s.is_ending), "{}", story.id);
        }
    }

    #[test]
    fn test_get_story_by_id_returns_story() {
        let store = bundled_store();

        let story = store.get_story_by_id("silvia-story").unwrap();

        assert_eq!(story.id, "silvia-story");
        assert_eq!(story.entry_scene().unwrap().id, "silvia-start");
    }

    #[test]
    fn test_get_story_by_id_unknown_is_not_found() {
        let store = bundled_store();

        match store.get_story_by_id("nobody") {
            Err(DomainError::NotFound { kind, id }) => {
                assert_eq!(kind, "story");
                assert_eq!(id, "nobody");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_lookups_are_idempotent() {
        let store = bundled_store();

        let first = store.get_story_by_id("sawa-story").unwrap().clone();
        let second = store.get_story_by_id("sawa-story").unwrap().clone();
        let scene_a = store.find_scene_in_story(&first, "sawa-herd").unwrap();
        let scene_b = store.find_scene_in_story(&second, "sawa-herd").unwrap();

        assert_eq!(first, second);
        assert_eq!(scene_a, scene_b);
    }

    #[test]
    fn test_find_scene_in_story_unknown_is_not_found() {
        let store = bundled_store();
        let story = store.get_story_by_id("silvia-story").unwrap();

        let result = store.find_scene_in_story(story, "sawa-herd");

        assert!(matches!(result, Err(DomainError::NotFound { kind: "scene", .. })));
    }

    #[test]
    fn test_list_stories_is_restartable() {
        let store = bundled_store();

        let first: Vec<&str> = store.list_stories().iter().map(|s| s.id.as_str()).collect();
        let second: Vec<&str> = store.list_stories().iter().map(|s| s.id.as_str()).collect();

        assert_eq!(first, vec!["silvia-story", "sawa-story"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_story_for_hotspot_prefers_explicit_binding() {
        let store = bundled_store();
        let turkana = store.get_hotspot_by_id("turkana").unwrap();

        assert_eq!(store.story_for_hotspot(turkana).id, "sawa-story");
    }

    #[test]
    fn test_story_for_hotspot_falls_back_to_title_then_first_story() {
        let store = bundled_store();
        let kisumu = store.get_hotspot_by_id("kisumu").unwrap();

        assert_eq!(store.story_for_hotspot(kisumu).id, "silvia-story");

        let mut renamed = kisumu.clone();
        renamed.name = "Turkana".to_owned();
        assert_eq!(store.story_for_hotspot(&renamed).id, "sawa-story");
    }

    #[test]
    fn test_from_dir_missing_directory_is_io_error() {
        let result = ContentStore::from_dir(Path::new("/nonexistent/content"), LoadOptions::strict());

        assert!(matches!(result, Err(ContentError::Io { .. })));
    }
}
