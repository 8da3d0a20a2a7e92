//! Intents a donor can issue against a journey.

use donorpath_core::command::Command;
use uuid::Uuid;

macro_rules! journey_command {
    ($name:ident, $label:literal) => {
        impl Command for $name {
            fn command_type(&self) -> &'static str {
                $label
            }

            fn correlation_id(&self) -> Uuid {
                self.correlation_id
            }

            fn aggregate_id(&self) -> Uuid {
                self.journey_id
            }
        }
    };
}

/// Command to start a new journey on the intro screen.
#[derive(Debug, Clone)]
pub struct StartJourney {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The journey to create.
    pub journey_id: Uuid,
}

/// Command to open the hotspot map.
#[derive(Debug, Clone)]
pub struct OpenMap {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
}

/// Command to pick a hotspot on the map.
#[derive(Debug, Clone)]
pub struct SelectHotspot {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
    /// The hotspot picked.
    pub hotspot_id: String,
}

/// Command to explore the selected hotspot's region.
#[derive(Debug, Clone)]
pub struct ExploreRegion {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
}

/// Command to open a story on its entry scene.
#[derive(Debug, Clone)]
pub struct BeginStory {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
    /// The story to open.
    pub story_id: String,
}

/// Command to take a choice on the current scene.
#[derive(Debug, Clone)]
pub struct SelectChoice {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
    /// The choice taken.
    pub choice_id: String,
    /// Scene the donor was looking at when choosing. Rejected as stale if
    /// the journey has moved on since.
    pub scene_id: Option<String>,
}

/// Command to close a story that reached its ending.
#[derive(Debug, Clone)]
pub struct CompleteStory {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
}

/// Command to open the impact summary.
#[derive(Debug, Clone)]
pub struct ViewImpactSummary {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
}

/// Command to step back one screen.
#[derive(Debug, Clone)]
pub struct GoBack {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
}

/// Command to return the journey to the intro with nothing selected.
#[derive(Debug, Clone)]
pub struct ResetJourney {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
}

/// Why a journey was ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The client closed the session.
    Closed,
    /// Nothing was recorded for longer than the idle timeout.
    Idle,
}

impl EndReason {
    /// Label recorded with the end of the session.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Idle => "idle",
        }
    }
}

/// Command to end a journey and discard its stream.
#[derive(Debug, Clone)]
pub struct EndJourney {
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target journey.
    pub journey_id: Uuid,
    /// Who ended it.
    pub reason: EndReason,
}

journey_command!(StartJourney, "journey.start");
journey_command!(OpenMap, "journey.open_map");
journey_command!(SelectHotspot, "journey.select_hotspot");
journey_command!(ExploreRegion, "journey.explore_region");
journey_command!(BeginStory, "journey.begin_story");
journey_command!(SelectChoice, "journey.select_choice");
journey_command!(CompleteStory, "journey.complete_story");
journey_command!(ViewImpactSummary, "journey.view_impact_summary");
journey_command!(GoBack, "journey.go_back");
journey_command!(ResetJourney, "journey.reset");
journey_command!(EndJourney, "journey.end");
