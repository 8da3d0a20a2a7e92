//! Story progress and impact-point rules.

use serde::Serialize;

/// Progress once a story has been begun, before any choice.
pub const STORY_BEGUN_PROGRESS: f64 = 25.0;

/// Ceiling for progress while the current scene is not an ending.
pub const MAX_IN_STORY_PROGRESS: f64 = 99.0;

/// Progress on an ending scene.
pub const STORY_COMPLETE_PROGRESS: f64 = 100.0;

/// Points for a choice that mentions KEF, scholarships or education.
pub const EDUCATION_CHOICE_POINTS: u32 = 50;

/// Points for any other choice.
pub const NEUTRAL_CHOICE_POINTS: u32 = 10;

const EDUCATION_KEYWORDS: [&str; 3] = ["kef", "scholarship", "education"];

/// Progress after moving to the scene at `scene_index` of `scene_count`.
///
/// Never lower than `previous`. Exactly [`STORY_COMPLETE_PROGRESS`] on an
/// ending and below it everywhere else.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn story_progress(scene_index: usize, scene_count: usize, is_ending: bool, previous: f64) -> f64 {
    if is_ending {
        return STORY_COMPLETE_PROGRESS;
    }
    let positional = if scene_count == 0 {
        0.0
    } else {
        (scene_index + 1) as f64 / scene_count as f64 * 100.0
    };
    positional.max(previous).min(MAX_IN_STORY_PROGRESS)
}

/// Impact points earned by a choice, judged by its text.
#[must_use]
pub fn choice_points(choice_text: &str) -> u32 {
    let text = choice_text.to_lowercase();
    if EDUCATION_KEYWORDS.iter().any(|keyword| text.contains(keyword)) {
        EDUCATION_CHOICE_POINTS
    } else {
        NEUTRAL_CHOICE_POINTS
    }
}

/// Verdict on a journey's accumulated impact points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactGrade {
    /// More than 150 points.
    Excellent,
    /// More than 100 points.
    Good,
    /// Everything else.
    KeepLearning,
}

impl ImpactGrade {
    /// Grades a point total.
    #[must_use]
    pub fn for_points(points: u32) -> Self {
        if points > 150 {
            Self::Excellent
        } else if points > 100 {
            Self::Good
        } else {
            Self::KeepLearning
        }
    }
}
