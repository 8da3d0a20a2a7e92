//! Scene view model and choice debouncing.
//!
//! A selected choice is held for [`SELECTION_DELAY_MS`] so the reader sees
//! it highlighted before the scene changes. Once anything has been
//! selected or completed, the presenter ignores further input until the
//! next scene is presented, so one scene visit yields at most one intent.

use chrono::{DateTime, TimeDelta, Utc};
use donorpath_content::Scene;
use serde::Serialize;

/// Delay between selecting a choice and releasing it as an intent.
pub const SELECTION_DELAY_MS: i64 = 800;

/// Progress covered by one chapter.
const PROGRESS_PER_CHAPTER: f64 = 25.0;

/// An intent produced by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneIntent {
    /// A choice was taken on `scene_id`.
    ChoiceSelected {
        /// The choice taken.
        choice_id: String,
        /// Scene the choice belongs to.
        scene_id: String,
    },
    /// The reader finished the story on an ending scene.
    CompleteRequested,
}

/// A choice button.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceView {
    /// Choice id.
    pub id: String,
    /// Button text.
    pub text: String,
    /// Optional impact note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    /// Whether this is the choice awaiting release.
    pub selected: bool,
}

/// Everything needed to draw the current scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneView {
    /// Scene id.
    pub scene_id: String,
    /// Scene heading.
    pub title: String,
    /// Narrative text.
    pub content: String,
    /// Illustration.
    pub image_url: String,
    /// Choice buttons; empty on an ending.
    pub choices: Vec<ChoiceView>,
    /// Whether this scene ends the story.
    pub is_ending: bool,
    /// Story progress rounded to a whole percent.
    pub progress: u8,
    /// `ceil(progress / 25)`.
    pub chapter: u8,
    /// Whether input is currently ignored.
    pub locked: bool,
}

#[derive(Debug, Clone)]
struct PendingSelection {
    choice_id: String,
    release_at: DateTime<Utc>,
}

/// Holds the scene on screen and turns clicks into intents.
#[derive(Debug, Default)]
pub struct ScenePresenter {
    scene: Option<Scene>,
    progress: f64,
    pending: Option<PendingSelection>,
    locked: bool,
}

impl ScenePresenter {
    /// A presenter with nothing on screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `scene` at `progress` and accepts input again.
    pub fn present(&mut self, scene: &Scene, progress: f64) {
        self.scene = Some(scene.clone());
        self.progress = progress.clamp(0.0, 100.0);
        self.pending = None;
        self.locked = false;
    }

    /// Whether input is being ignored.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// View of the current scene, if one is presented.
    #[must_use]
    pub fn view(&self) -> Option<SceneView> {
        let scene = self.scene.as_ref()?;
        let pending = self.pending.as_ref().map(|p| p.choice_id.as_str());
        Some(SceneView {
            scene_id: scene.id.clone(),
            title: scene.title.clone(),
            content: scene.content.clone(),
            image_url: scene.image_url.clone(),
            choices: scene
                .choices
                .iter()
                .map(|choice| ChoiceView {
                    id: choice.id.clone(),
                    text: choice.text.clone(),
                    impact: choice.impact.clone(),
                    selected: pending == Some(choice.id.as_str()),
                })
                .collect(),
            is_ending: scene.is_ending,
            progress: whole_percent(self.progress),
            chapter: chapter(self.progress),
            locked: self.locked,
        })
    }

    /// Selects a choice on the current scene. Returns whether the selection
    /// was accepted; unknown choices and input while locked are ignored.
    pub fn select(&mut self, choice_id: &str, now: DateTime<Utc>) -> bool {
        let Some(scene) = &self.scene else {
            return false;
        };
        if self.locked || scene.is_ending || scene.choice(choice_id).is_none() {
            return false;
        }
        self.pending = Some(PendingSelection {
            choice_id: choice_id.to_owned(),
            release_at: now + TimeDelta::milliseconds(SELECTION_DELAY_MS),
        });
        self.locked = true;
        true
    }

    /// Releases the pending selection once its delay has elapsed. Yields at
    /// most one intent per presented scene.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<SceneIntent> {
        if now < self.pending.as_ref()?.release_at {
            return None;
        }
        let pending = self.pending.take()?;
        let scene_id = self.scene.as_ref()?.id.clone();
        Some(SceneIntent::ChoiceSelected {
            choice_id: pending.choice_id,
            scene_id,
        })
    }

    /// Requests completion on an ending scene. Ignored anywhere else and
    /// after the first request.
    pub fn complete(&mut self) -> Option<SceneIntent> {
        let scene = self.scene.as_ref()?;
        if self.locked || !scene.is_ending {
            return None;
        }
        self.locked = true;
        Some(SceneIntent::CompleteRequested)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_percent(progress: f64) -> u8 {
    progress.round().clamp(0.0, 100.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn chapter(progress: f64) -> u8 {
    (progress / PROGRESS_PER_CHAPTER).ceil().clamp(0.0, 4.0) as u8
}
