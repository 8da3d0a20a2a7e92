//! Domain events for journeys.

use donorpath_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stage::Stage;

/// Event type of [`JourneyStarted`].
pub const JOURNEY_STARTED: &str = "journey.started";
/// Event type of [`MapOpened`].
pub const MAP_OPENED: &str = "journey.map_opened";
/// Event type of [`HotspotSelected`].
pub const HOTSPOT_SELECTED: &str = "journey.hotspot_selected";
/// Event type of [`RegionExplorationStarted`].
pub const REGION_EXPLORATION_STARTED: &str = "journey.region_exploration_started";
/// Event type of [`StoryBegun`].
pub const STORY_BEGUN: &str = "journey.story_begun";
/// Event type of [`ChoiceSelected`].
pub const CHOICE_SELECTED: &str = "journey.choice_selected";
/// Event type of [`StoryCompleted`].
pub const STORY_COMPLETED: &str = "journey.story_completed";
/// Event type of [`ImpactSummaryViewed`].
pub const IMPACT_SUMMARY_VIEWED: &str = "journey.impact_summary_viewed";
/// Event type of [`SteppedBack`].
pub const STEPPED_BACK: &str = "journey.stepped_back";
/// Event type of [`JourneyReset`].
pub const JOURNEY_RESET: &str = "journey.reset";

/// Emitted once when a journey begins on the intro screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyStarted {
    /// The journey identifier.
    pub journey_id: Uuid,
}

/// Emitted when the donor opens the hotspot map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOpened {
    /// Stage the map was opened from.
    pub from: Stage,
}

/// Emitted when a hotspot is picked on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotSelected {
    /// The chosen hotspot.
    pub hotspot_id: String,
    /// Story the hotspot resolves to.
    pub story_id: String,
}

/// Emitted when the donor explores the selected hotspot's region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionExplorationStarted {
    /// The hotspot being explored.
    pub hotspot_id: String,
}

/// Emitted when a story is opened on its entry scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryBegun {
    /// The story opened.
    pub story_id: String,
    /// Its entry scene.
    pub entry_scene_id: String,
    /// Progress after opening.
    pub progress: f64,
}

/// Emitted when a choice moves the story to its next scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceSelected {
    /// The choice taken.
    pub choice_id: String,
    /// Scene the choice was taken on.
    pub from_scene_id: String,
    /// Scene the choice leads to.
    pub to_scene_id: String,
    /// Impact points earned.
    pub points: u32,
    /// Story progress after the move.
    pub progress: f64,
    /// Whether `to_scene_id` ends the story.
    pub ending: bool,
}

/// Emitted when a finished story is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryCompleted {
    /// The story finished.
    pub story_id: String,
    /// Region the story was reached from, if any.
    pub hotspot_id: Option<String>,
}

/// Emitted when the donor opens the impact summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummaryViewed {
    /// Points accumulated at that moment.
    pub impact_points: u32,
}

/// Emitted when the donor steps back one screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteppedBack {
    /// Stage left.
    pub from: Stage,
    /// Stage entered.
    pub to: Stage,
}

/// Emitted when the journey is reset to the intro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyReset {
    /// Stage the reset was issued from.
    pub from: Stage,
}

/// Event payload variants for journeys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JourneyEventKind {
    /// The journey has started.
    JourneyStarted(JourneyStarted),
    /// The map has been opened.
    MapOpened(MapOpened),
    /// A hotspot has been selected.
    HotspotSelected(HotspotSelected),
    /// Region exploration has started.
    RegionExplorationStarted(RegionExplorationStarted),
    /// A story has been begun.
    StoryBegun(StoryBegun),
    /// A choice has been selected.
    ChoiceSelected(ChoiceSelected),
    /// A story has been completed.
    StoryCompleted(StoryCompleted),
    /// The impact summary has been viewed.
    ImpactSummaryViewed(ImpactSummaryViewed),
    /// The donor stepped back.
    SteppedBack(SteppedBack),
    /// The journey has been reset.
    JourneyReset(JourneyReset),
}

impl JourneyEventKind {
    /// Event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::JourneyStarted(_) => JOURNEY_STARTED,
            Self::MapOpened(_) => MAP_OPENED,
            Self::HotspotSelected(_) => HOTSPOT_SELECTED,
            Self::RegionExplorationStarted(_) => REGION_EXPLORATION_STARTED,
            Self::StoryBegun(_) => STORY_BEGUN,
            Self::ChoiceSelected(_) => CHOICE_SELECTED,
            Self::StoryCompleted(_) => STORY_COMPLETED,
            Self::ImpactSummaryViewed(_) => IMPACT_SUMMARY_VIEWED,
            Self::SteppedBack(_) => STEPPED_BACK,
            Self::JourneyReset(_) => JOURNEY_RESET,
        }
    }
}

/// Domain event envelope for journeys.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: JourneyEventKind,
}

impl DomainEvent for JourneyEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("JourneyEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
