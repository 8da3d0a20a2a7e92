//! Journey stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a donor currently is in the experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Landing screen.
    Intro,
    /// Map of all hotspots.
    MapOverview,
    /// A hotspot is selected; its story can be started.
    StorySelection,
    /// Reading a story.
    StoryExperience,
    /// The current story reached an ending scene.
    Completed,
    /// Exploring the selected region.
    MapExploration,
    /// Connecting the story to real programs.
    Connections,
    /// Reviewing accumulated impact.
    ImpactSummary,
}

impl Stage {
    /// Every stage, in journey order.
    pub const ALL: [Self; 8] = [
        Self::Intro,
        Self::MapOverview,
        Self::StorySelection,
        Self::StoryExperience,
        Self::Completed,
        Self::MapExploration,
        Self::Connections,
        Self::ImpactSummary,
    ];

    /// Stable label used in logs, errors and engagement records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::MapOverview => "map_overview",
            Self::StorySelection => "story_selection",
            Self::StoryExperience => "story_experience",
            Self::Completed => "completed",
            Self::MapExploration => "map_exploration",
            Self::Connections => "connections",
            Self::ImpactSummary => "impact_summary",
        }
    }

    /// Whole-journey progress bar value for this stage.
    #[must_use]
    pub fn journey_progress(self) -> u8 {
        match self {
            Self::Intro => 10,
            Self::MapOverview => 20,
            Self::StorySelection => 30,
            Self::StoryExperience | Self::Completed => 50,
            Self::MapExploration => 70,
            Self::Connections => 85,
            Self::ImpactSummary => 100,
        }
    }

    /// Whether a story is open in this stage.
    #[must_use]
    pub fn in_story(self) -> bool {
        matches!(self, Self::StoryExperience | Self::Completed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
