//! Aggregate root for a donor's journey.

use std::collections::BTreeSet;

use donorpath_content::{ContentStore, Scene, Story};
use donorpath_core::aggregate::AggregateRoot;
use donorpath_core::clock::Clock;
use donorpath_core::error::DomainError;
use donorpath_core::event::EventMetadata;
use tracing::error;
use uuid::Uuid;

use super::events::{
    ChoiceSelected, HotspotSelected, ImpactSummaryViewed, JourneyEvent, JourneyEventKind,
    JourneyReset, JourneyStarted, MapOpened, RegionExplorationStarted, SteppedBack, StoryBegun,
    StoryCompleted,
};
use super::scoring::{ImpactGrade, STORY_BEGUN_PROGRESS, choice_points, story_progress};
use super::stage::Stage;

/// The aggregate root for one donor's journey.
///
/// Stories, scenes and hotspots are held by id and resolved against the
/// shared [`ContentStore`] when an intent needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneySession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (committed event count).
    pub(crate) version: i64,
    pub(crate) started: bool,
    pub(crate) stage: Stage,
    pub(crate) selected_story_id: Option<String>,
    pub(crate) current_scene_id: Option<String>,
    pub(crate) selected_hotspot_id: Option<String>,
    pub(crate) visited_regions: BTreeSet<String>,
    pub(crate) completed_stories: BTreeSet<String>,
    pub(crate) choice_history: Vec<String>,
    pub(crate) impact_points: u32,
    pub(crate) progress_percent: f64,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<JourneyEvent>,
}

impl JourneySession {
    /// Creates an empty, not yet started journey.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            started: false,
            stage: Stage::Intro,
            selected_story_id: None,
            current_scene_id: None,
            selected_hotspot_id: None,
            visited_regions: BTreeSet::new(),
            completed_stories: BTreeSet::new(),
            choice_history: Vec::new(),
            impact_points: 0,
            progress_percent: 0.0,
            uncommitted_events: Vec::new(),
        }
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether a `JourneyStarted` event exists.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The open story, if any.
    #[must_use]
    pub fn selected_story_id(&self) -> Option<&str> {
        self.selected_story_id.as_deref()
    }

    /// The scene being read, if any.
    #[must_use]
    pub fn current_scene_id(&self) -> Option<&str> {
        self.current_scene_id.as_deref()
    }

    /// The hotspot picked on the map, if any.
    #[must_use]
    pub fn selected_hotspot_id(&self) -> Option<&str> {
        self.selected_hotspot_id.as_deref()
    }

    /// Hotspots whose story has been completed.
    #[must_use]
    pub fn visited_regions(&self) -> &BTreeSet<String> {
        &self.visited_regions
    }

    /// Stories read to an ending and closed.
    #[must_use]
    pub fn completed_stories(&self) -> &BTreeSet<String> {
        &self.completed_stories
    }

    /// Choices taken in the open story, in order.
    #[must_use]
    pub fn choice_history(&self) -> &[String] {
        &self.choice_history
    }

    /// Points accumulated across every story this journey.
    #[must_use]
    pub fn impact_points(&self) -> u32 {
        self.impact_points
    }

    /// Progress through the open story, 0 to 100.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    /// Grade for the accumulated points.
    #[must_use]
    pub fn impact_grade(&self) -> ImpactGrade {
        ImpactGrade::for_points(self.impact_points)
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn emit(&mut self, kind: JourneyEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let metadata = EventMetadata::for_command(
            kind.event_type(),
            self.id,
            self.next_sequence_number(),
            correlation_id,
            clock.now(),
        );
        self.mutate(&kind);
        self.uncommitted_events.push(JourneyEvent { metadata, kind });
    }

    fn rejected(&self, intent: &'static str) -> DomainError {
        DomainError::InvalidTransition {
            stage: self.stage.as_str().to_owned(),
            intent,
        }
    }

    fn require_stage(&self, accepted: &[Stage], intent: &'static str) -> Result<(), DomainError> {
        if accepted.contains(&self.stage) {
            Ok(())
        } else {
            Err(self.rejected(intent))
        }
    }

    fn open_scene<'c>(
        &self,
        content: &'c ContentStore,
        intent: &'static str,
    ) -> Result<(&'c Story, &'c Scene), DomainError> {
        let (Some(story_id), Some(scene_id)) = (
            self.selected_story_id.as_deref(),
            self.current_scene_id.as_deref(),
        ) else {
            return Err(self.rejected(intent));
        };
        let story = content.get_story_by_id(story_id)?;
        let scene = content.find_scene_in_story(story, scene_id)?;
        Ok((story, scene))
    }

    /// Starts the journey on the intro screen.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the journey already started.
    pub fn start(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if self.started {
            return Err(self.rejected("start"));
        }
        let kind = JourneyEventKind::JourneyStarted(JourneyStarted {
            journey_id: self.id,
        });
        self.emit(kind, correlation_id, clock);
        Ok(())
    }

    /// Opens the hotspot map.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless in `Intro`,
    /// `Connections` or `MapExploration`.
    pub fn open_map(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        self.require_stage(
            &[Stage::Intro, Stage::Connections, Stage::MapExploration],
            "open_map",
        )?;
        let kind = JourneyEventKind::MapOpened(MapOpened { from: self.stage });
        self.emit(kind, correlation_id, clock);
        Ok(())
    }

    /// Picks a hotspot and moves to story selection.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless on the map or in
    /// `Connections`, and `DomainError::NotFound` for an unknown hotspot.
    pub fn select_hotspot(
        &mut self,
        hotspot_id: &str,
        content: &ContentStore,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_stage(
            &[Stage::MapOverview, Stage::MapExploration, Stage::Connections],
            "select_hotspot",
        )?;
        let hotspot = content.get_hotspot_by_id(hotspot_id)?;
        let story = content.story_for_hotspot(hotspot);
        let kind = JourneyEventKind::HotspotSelected(HotspotSelected {
            hotspot_id: hotspot.id.clone(),
            story_id: story.id.clone(),
        });
        self.emit(kind, correlation_id, clock);
        Ok(())
    }

    /// Explores the selected hotspot's region.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless in `StorySelection`,
    /// and `DomainError::Validation` if no hotspot is selected.
    pub fn explore_region(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_stage(&[Stage::StorySelection], "explore_region")?;
        let hotspot_id = self
            .selected_hotspot_id
            .clone()
            .ok_or_else(|| DomainError::Validation("no hotspot selected".to_owned()))?;
        let kind =
            JourneyEventKind::RegionExplorationStarted(RegionExplorationStarted { hotspot_id });
        self.emit(kind, correlation_id, clock);
        Ok(())
    }

    /// Opens a story on its entry scene.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless in `StorySelection`,
    /// `MapOverview` or `Connections`, and `DomainError::NotFound` for an
    /// unknown story.
    pub fn begin_story(
        &mut self,
        story_id: &str,
        content: &ContentStore,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_stage(
            &[Stage::StorySelection, Stage::MapOverview, Stage::Connections],
            "begin_story",
        )?;
        let story = content.get_story_by_id(story_id)?;
        let entry = story
            .entry_scene()
            .ok_or_else(|| DomainError::not_found("scene", format!("{story_id}#entry")))?;
        let kind = JourneyEventKind::StoryBegun(StoryBegun {
            story_id: story.id.clone(),
            entry_scene_id: entry.id.clone(),
            progress: STORY_BEGUN_PROGRESS,
        });
        self.emit(kind, correlation_id, clock);
        Ok(())
    }

    /// Takes a choice on the current scene.
    ///
    /// `issued_for` is the scene the donor saw when choosing; if the journey
    /// has moved on since, the intent is stale.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StaleIntent` for an outdated `issued_for`,
    /// `DomainError::InvalidTransition` outside `StoryExperience` or on an
    /// ending, `DomainError::NotFound` for a choice not on the current scene,
    /// and `DomainError::BrokenContentGraph` if the choice leads nowhere.
    pub fn select_choice(
        &mut self,
        choice_id: &str,
        issued_for: Option<&str>,
        content: &ContentStore,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if let (Some(issued_for), Some(current)) = (issued_for, self.current_scene_id.as_deref()) {
            if issued_for != current {
                return Err(DomainError::StaleIntent {
                    issued_for: issued_for.to_owned(),
                    current: current.to_owned(),
                });
            }
        }
        self.require_stage(&[Stage::StoryExperience], "select_choice")?;

        let (story, scene) = self.open_scene(content, "select_choice")?;
        if scene.is_ending {
            return Err(self.rejected("select_choice"));
        }
        let choice = scene
            .choice(choice_id)
            .ok_or_else(|| DomainError::not_found("choice", choice_id))?;
        let (Some(next), Some(index)) = (
            story.scene(&choice.next_scene_id),
            story.scene_index(&choice.next_scene_id),
        ) else {
            error!(
                story_id = %story.id,
                scene_id = %scene.id,
                next_scene_id = %choice.next_scene_id,
                "choice leads to a scene missing from its story"
            );
            return Err(DomainError::BrokenContentGraph {
                story_id: story.id.clone(),
                scene_id: scene.id.clone(),
                next_scene_id: choice.next_scene_id.clone(),
            });
        };

        let kind = JourneyEventKind::ChoiceSelected(ChoiceSelected {
            choice_id: choice.id.clone(),
            from_scene_id: scene.id.clone(),
            to_scene_id: next.id.clone(),
            points: choice_points(&choice.text),
            progress: story_progress(
                index,
                story.scenes.len(),
                next.is_ending,
                self.progress_percent,
            ),
            ending: next.is_ending,
        });
        self.emit(kind, correlation_id, clock);
        Ok(())
    }

    /// Closes a story that reached its ending and moves on to connections.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless the current scene is
    /// an ending.
    pub fn complete_story(
        &mut self,
        content: &ContentStore,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_stage(
            &[Stage::StoryExperience, Stage::Completed],
            "complete_story",
        )?;
        let (story, scene) = self.open_scene(content, "complete_story")?;
        if !scene.is_ending {
            return Err(self.rejected("complete_story"));
        }
        // A hotspot only counts as visited when it leads into this story.
        let hotspot_id = self
            .selected_hotspot_id
            .as_deref()
            .and_then(|id| content.get_hotspot_by_id(id).ok())
            .filter(|hotspot| content.story_for_hotspot(hotspot).id == story.id)
            .map(|hotspot| hotspot.id.clone());
        let kind = JourneyEventKind::StoryCompleted(StoryCompleted {
            story_id: story.id.clone(),
            hotspot_id,
        });
        self.emit(kind, correlation_id, clock);
        Ok(())
    }

    /// Opens the impact summary.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` unless in `Connections`.
    pub fn view_impact_summary(
        &mut self,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.require_stage(&[Stage::Connections], "view_impact_summary")?;
        let kind = JourneyEventKind::ImpactSummaryViewed(ImpactSummaryViewed {
            impact_points: self.impact_points,
        });
        self.emit(kind, correlation_id, clock);
        Ok(())
    }

    /// Steps back one screen. On the intro screen this does nothing.
    pub fn go_back(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        let to = match self.stage {
            Stage::StoryExperience | Stage::Completed | Stage::MapExploration => {
                Stage::StorySelection
            }
            Stage::StorySelection | Stage::Connections => Stage::MapOverview,
            Stage::MapOverview | Stage::Intro => Stage::Intro,
            Stage::ImpactSummary => Stage::Connections,
        };
        if to == self.stage {
            return;
        }
        let kind = JourneyEventKind::SteppedBack(SteppedBack {
            from: self.stage,
            to,
        });
        self.emit(kind, correlation_id, clock);
    }

    /// Returns to the intro with nothing selected, visited or scored.
    pub fn reset(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        let kind = JourneyEventKind::JourneyReset(JourneyReset { from: self.stage });
        self.emit(kind, correlation_id, clock);
    }

    fn mutate(&mut self, kind: &JourneyEventKind) {
        match kind {
            JourneyEventKind::JourneyStarted(_) => {
                self.started = true;
                self.stage = Stage::Intro;
            }
            JourneyEventKind::MapOpened(_) => {
                self.stage = Stage::MapOverview;
            }
            JourneyEventKind::HotspotSelected(payload) => {
                self.selected_hotspot_id = Some(payload.hotspot_id.clone());
                self.stage = Stage::StorySelection;
            }
            JourneyEventKind::RegionExplorationStarted(_) => {
                self.stage = Stage::MapExploration;
            }
            JourneyEventKind::StoryBegun(payload) => {
                self.selected_story_id = Some(payload.story_id.clone());
                self.current_scene_id = Some(payload.entry_scene_id.clone());
                self.choice_history.clear();
                self.progress_percent = payload.progress;
                self.stage = Stage::StoryExperience;
            }
            JourneyEventKind::ChoiceSelected(payload) => {
                self.choice_history.push(payload.choice_id.clone());
                self.current_scene_id = Some(payload.to_scene_id.clone());
                self.impact_points = self.impact_points.saturating_add(payload.points);
                self.progress_percent = payload.progress;
                if payload.ending {
                    self.stage = Stage::Completed;
                }
            }
            JourneyEventKind::StoryCompleted(payload) => {
                self.completed_stories.insert(payload.story_id.clone());
                if let Some(hotspot_id) = &payload.hotspot_id {
                    self.visited_regions.insert(hotspot_id.clone());
                }
                self.stage = Stage::Connections;
            }
            JourneyEventKind::ImpactSummaryViewed(_) => {
                self.stage = Stage::ImpactSummary;
            }
            JourneyEventKind::SteppedBack(payload) => {
                if payload.from.in_story() {
                    self.selected_story_id = None;
                    self.current_scene_id = None;
                    self.progress_percent = 0.0;
                }
                self.stage = payload.to;
            }
            JourneyEventKind::JourneyReset(_) => {
                self.stage = Stage::Intro;
                self.selected_story_id = None;
                self.current_scene_id = None;
                self.selected_hotspot_id = None;
                self.visited_regions.clear();
                self.completed_stories.clear();
                self.choice_history.clear();
                self.impact_points = 0;
                self.progress_percent = 0.0;
            }
        }
    }
}

impl AggregateRoot for JourneySession {
    type Event = JourneyEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(&event.kind);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
