//! Query handlers for journeys.
//!
//! Reconstitutes the aggregate from its events and resolves the ids it holds
//! against the content catalog.

use donorpath_content::{ContentStore, MapHotspot};
use donorpath_core::aggregate::AggregateRoot;
use donorpath_core::error::DomainError;
use donorpath_core::repository::EventRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::application::command_handlers;
use crate::domain::scoring::ImpactGrade;
use crate::domain::stage::Stage;
use crate::presentation::scene_presenter::{ScenePresenter, SceneView};

/// Short description of the open story.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    /// Story id.
    pub id: String,
    /// Story title.
    pub title: String,
    /// Teaser text.
    pub description: String,
    /// Number of scenes.
    pub scene_count: usize,
}

/// Read-only view of a journey.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneySnapshot {
    /// The journey identifier.
    pub journey_id: Uuid,
    /// Current version (event count).
    pub version: i64,
    /// Current stage.
    pub stage: Stage,
    /// Whole-journey progress bar value.
    pub journey_progress: u8,
    /// The open story, if any.
    pub selected_story: Option<StorySummary>,
    /// The scene being read, while a story is open.
    pub current_scene: Option<SceneView>,
    /// The hotspot picked on the map, if any.
    pub selected_hotspot: Option<MapHotspot>,
    /// Hotspots whose story was completed.
    pub visited_regions: Vec<String>,
    /// Stories completed.
    pub completed_stories: Vec<String>,
    /// Choices taken in the open story.
    pub choice_history: Vec<String>,
    /// Accumulated impact points.
    pub impact_points: u32,
    /// Grade for `impact_points`.
    pub impact_grade: ImpactGrade,
    /// Progress through the open story.
    pub progress_percent: f64,
}

/// Retrieves a journey by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no events exist for the ID,
/// `DomainError::NotFound` if the journey refers to content that is no
/// longer in the catalog, and `DomainError::Infrastructure` if event
/// deserialization fails.
pub async fn get_journey_by_id(
    journey_id: Uuid,
    content: &ContentStore,
    repo: &dyn EventRepository,
) -> Result<JourneySnapshot, DomainError> {
    let session = command_handlers::load_journey(journey_id, repo).await?;

    let story = session
        .selected_story_id()
        .map(|id| content.get_story_by_id(id))
        .transpose()?;

    let current_scene = match (story, session.current_scene_id()) {
        (Some(story), Some(scene_id)) if session.stage().in_story() => {
            let scene = content.find_scene_in_story(story, scene_id)?;
            let mut presenter = ScenePresenter::new();
            presenter.present(scene, session.progress_percent());
            presenter.view()
        }
        _ => None,
    };

    let selected_hotspot = session
        .selected_hotspot_id()
        .map(|id| content.get_hotspot_by_id(id).cloned())
        .transpose()?;

    Ok(JourneySnapshot {
        journey_id,
        version: session.version(),
        stage: session.stage(),
        journey_progress: session.stage().journey_progress(),
        selected_story: story.map(|story| StorySummary {
            id: story.id.clone(),
            title: story.title.clone(),
            description: story.description.clone(),
            scene_count: story.scenes.len(),
        }),
        current_scene,
        selected_hotspot,
        visited_regions: session.visited_regions().iter().cloned().collect(),
        completed_stories: session.completed_stories().iter().cloned().collect(),
        choice_history: session.choice_history().to_vec(),
        impact_points: session.impact_points(),
        impact_grade: session.impact_grade(),
        progress_percent: session.progress_percent(),
    })
}
