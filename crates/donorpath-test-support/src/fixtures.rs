//! Small content documents for tests that need a known story graph.
//!
//! These are raw JSON so any crate can load them through its own
//! `ContentStore` without this crate depending on the content crate.

/// A single linear four-scene story plus a second story with a dangling
/// choice. Load with lenient graph checking.
pub const STORIES_JSON: &str = r#"{
  "stories": [
    {
      "id": "river-story",
      "title": "Across the River",
      "description": "Four scenes, three choices, one ending.",
      "scenes": [
        {
          "id": "river-1",
          "title": "The Flood",
          "content": "The bridge is gone.",
          "imageUrl": "/img/river-1.jpg",
          "choices": [
            { "id": "river-c1", "text": "Ask about a scholarship", "nextSceneId": "river-2" }
          ]
        },
        {
          "id": "river-2",
          "title": "The Ferry",
          "content": "A ferryman offers a ride for a price.",
          "imageUrl": "/img/river-2.jpg",
          "choices": [
            { "id": "river-c2", "text": "Work the ferry for a week", "nextSceneId": "river-3" }
          ]
        },
        {
          "id": "river-3",
          "title": "The Classroom",
          "content": "A seat by the window.",
          "imageUrl": "/img/river-3.jpg",
          "choices": [
            { "id": "river-c3", "text": "Study for the education exam", "nextSceneId": "river-4" }
          ]
        },
        {
          "id": "river-4",
          "title": "Graduation",
          "content": "Caps in the air.",
          "imageUrl": "/img/river-4.jpg",
          "choices": [],
          "isEnding": true
        }
      ]
    },
    {
      "id": "broken-story",
      "title": "The Missing Page",
      "description": "One choice leads nowhere.",
      "scenes": [
        {
          "id": "broken-1",
          "title": "A Fork",
          "content": "Two paths.",
          "imageUrl": "/img/broken-1.jpg",
          "choices": [
            { "id": "broken-dangling", "text": "Take the torn path", "nextSceneId": "missing-scene" },
            { "id": "broken-ok", "text": "Take the paved path", "nextSceneId": "broken-2" }
          ]
        },
        {
          "id": "broken-2",
          "title": "Home",
          "content": "Safe.",
          "imageUrl": "/img/broken-2.jpg",
          "choices": [],
          "isEnding": true
        }
      ]
    }
  ]
}"#;

/// Hotspots matching [`STORIES_JSON`].
pub const HOTSPOTS_JSON: &str = r#"{
  "hotspots": [
    {
      "id": "riverside",
      "name": "Riverside",
      "coordinates": [-0.5, 35.2],
      "storyId": "river-story",
      "story": {
        "title": "Crossing to School",
        "content": "Seasonal floods cut the village off from school.",
        "imageUrl": "/img/riverside.jpg",
        "studentName": "Neema",
        "impact": "Boarding places during the rainy season."
      }
    },
    {
      "id": "hilltop",
      "name": "Hilltop",
      "coordinates": [0.3, 37.6],
      "story": {
        "title": "Above the Clouds",
        "content": "A long climb every morning.",
        "imageUrl": "/img/hilltop.jpg",
        "studentName": "Baraka",
        "impact": "Uniforms and books."
      }
    }
  ]
}"#;

/// The four-scene story id in [`STORIES_JSON`].
pub const LINEAR_STORY_ID: &str = "river-story";

/// The story id with a dangling choice in [`STORIES_JSON`].
pub const BROKEN_STORY_ID: &str = "broken-story";

/// The dangling choice id in [`BROKEN_STORY_ID`].
pub const DANGLING_CHOICE_ID: &str = "broken-dangling";

/// The hotspot bound to [`LINEAR_STORY_ID`].
pub const LINEAR_STORY_HOTSPOT_ID: &str = "riverside";

/// Choice ids walking [`LINEAR_STORY_ID`] from entry to ending.
pub const LINEAR_STORY_PATH: [&str; 3] = ["river-c1", "river-c2", "river-c3"];
