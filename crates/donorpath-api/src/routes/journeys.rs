//! Routes for the journey state machine.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use donorpath_core::error::DomainError;
use donorpath_core::repository::StoredEvent;
use donorpath_engagement::{ConversionFunnel, JourneyAnalytics};
use donorpath_journey::application::command_handlers;
use donorpath_journey::application::query_handlers::{self, JourneySnapshot};
use donorpath_journey::domain::commands;
use donorpath_journey::domain::stage::Stage;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{journey_id}/select-hotspot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectHotspotRequest {
    /// The hotspot picked on the map.
    pub hotspot_id: String,
}

/// Request body for POST /{journey_id}/begin-story.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginStoryRequest {
    /// The story to open.
    pub story_id: String,
}

/// Request body for POST /{journey_id}/select-choice.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectChoiceRequest {
    /// The choice taken.
    pub choice_id: String,
    /// Scene the choice was made on; stale submissions are rejected.
    #[serde(default)]
    pub scene_id: Option<String>,
}

/// Response body returned after an intent is handled.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResponse {
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
    /// The journey after the intent.
    pub journey: JourneySnapshot,
}

/// Response body for GET /{journey_id}/analytics.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    /// The session's engagement log.
    pub journey: JourneyAnalytics,
    /// Per-stage funnel derived from the log.
    pub funnel: ConversionFunnel,
}

async fn respond(
    state: &AppState,
    journey_id: Uuid,
    stored_events: &[StoredEvent],
) -> Result<Json<JourneyResponse>, ApiError> {
    let journey = query_handlers::get_journey_by_id(
        journey_id,
        &state.content,
        &*state.event_repository,
    )
    .await?;

    Ok(Json(JourneyResponse {
        event_ids: stored_events.iter().map(|e| e.event_id).collect(),
        journey,
    }))
}

/// POST /
#[instrument(skip(state))]
async fn start_journey(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<JourneyResponse>), ApiError> {
    let command = commands::StartJourney {
        correlation_id: Uuid::new_v4(),
        journey_id: Uuid::new_v4(),
    };

    info!(
        correlation_id = %command.correlation_id,
        journey_id = %command.journey_id,
        "handling start_journey command"
    );

    let tracker = state.open_tracker(command.journey_id, Stage::Intro.as_str());
    let stored_events = command_handlers::handle_start_journey(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        Some(tracker.as_ref()),
    )
    .await
    .inspect_err(|_| state.close_tracker(command.journey_id))?;

    let response = respond(&state, command.journey_id, &stored_events).await?;
    Ok((StatusCode::CREATED, response))
}

/// GET /{journey_id}
#[instrument(skip(state))]
async fn get_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneySnapshot>, ApiError> {
    let journey = query_handlers::get_journey_by_id(
        journey_id,
        &state.content,
        &*state.event_repository,
    )
    .await?;
    Ok(Json(journey))
}

/// POST /{journey_id}/open-map
#[instrument(skip(state))]
async fn open_map(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::OpenMap {
        correlation_id: Uuid::new_v4(),
        journey_id,
    };

    info!(correlation_id = %command.correlation_id, "handling open_map command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_open_map(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// POST /{journey_id}/select-hotspot
#[instrument(skip(state, request), fields(hotspot_id = %request.hotspot_id))]
async fn select_hotspot(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
    Json(request): Json<SelectHotspotRequest>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::SelectHotspot {
        correlation_id: Uuid::new_v4(),
        journey_id,
        hotspot_id: request.hotspot_id,
    };

    info!(correlation_id = %command.correlation_id, "handling select_hotspot command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_select_hotspot(
        &command,
        &state.content,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// POST /{journey_id}/explore-region
#[instrument(skip(state))]
async fn explore_region(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::ExploreRegion {
        correlation_id: Uuid::new_v4(),
        journey_id,
    };

    info!(correlation_id = %command.correlation_id, "handling explore_region command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_explore_region(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// POST /{journey_id}/begin-story
#[instrument(skip(state, request), fields(story_id = %request.story_id))]
async fn begin_story(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
    Json(request): Json<BeginStoryRequest>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::BeginStory {
        correlation_id: Uuid::new_v4(),
        journey_id,
        story_id: request.story_id,
    };

    info!(correlation_id = %command.correlation_id, "handling begin_story command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_begin_story(
        &command,
        &state.content,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// POST /{journey_id}/select-choice
#[instrument(skip(state, request), fields(choice_id = %request.choice_id))]
async fn select_choice(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
    Json(request): Json<SelectChoiceRequest>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::SelectChoice {
        correlation_id: Uuid::new_v4(),
        journey_id,
        choice_id: request.choice_id,
        scene_id: request.scene_id,
    };

    info!(correlation_id = %command.correlation_id, "handling select_choice command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_select_choice(
        &command,
        &state.content,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// POST /{journey_id}/complete-story
#[instrument(skip(state))]
async fn complete_story(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::CompleteStory {
        correlation_id: Uuid::new_v4(),
        journey_id,
    };

    info!(correlation_id = %command.correlation_id, "handling complete_story command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_complete_story(
        &command,
        &state.content,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// POST /{journey_id}/view-impact
#[instrument(skip(state))]
async fn view_impact(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::ViewImpactSummary {
        correlation_id: Uuid::new_v4(),
        journey_id,
    };

    info!(correlation_id = %command.correlation_id, "handling view_impact_summary command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_view_impact_summary(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// POST /{journey_id}/go-back
#[instrument(skip(state))]
async fn go_back(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::GoBack {
        correlation_id: Uuid::new_v4(),
        journey_id,
    };

    info!(correlation_id = %command.correlation_id, "handling go_back command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_go_back(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// POST /{journey_id}/reset
#[instrument(skip(state))]
async fn reset(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<JourneyResponse>, ApiError> {
    let command = commands::ResetJourney {
        correlation_id: Uuid::new_v4(),
        journey_id,
    };

    info!(correlation_id = %command.correlation_id, "handling reset_journey command");

    let tracker = state.tracker(journey_id);
    let stored_events = command_handlers::handle_reset_journey(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
        tracker.as_deref(),
    )
    .await?;

    respond(&state, journey_id, &stored_events).await
}

/// DELETE /{journey_id}
#[instrument(skip(state))]
async fn end_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let command = commands::EndJourney {
        correlation_id: Uuid::new_v4(),
        journey_id,
        reason: commands::EndReason::Closed,
    };

    info!(correlation_id = %command.correlation_id, "handling end_journey command");

    let tracker = state.tracker(journey_id);
    command_handlers::handle_end_journey(&command, &*state.event_repository, tracker.as_deref())
        .await?;
    state.close_tracker(journey_id);

    Ok(StatusCode::NO_CONTENT)
}

/// GET /{journey_id}/analytics
#[instrument(skip(state))]
async fn analytics(
    State(state): State<AppState>,
    Path(journey_id): Path<Uuid>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let tracker = state
        .tracker(journey_id)
        .ok_or_else(|| DomainError::not_found("journey analytics", journey_id.to_string()))?;

    Ok(Json(AnalyticsResponse {
        journey: tracker.journey_analytics(),
        funnel: tracker.conversion_funnel(),
    }))
}

/// Returns the router for journeys.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_journey))
        .route("/{journey_id}", get(get_journey).delete(end_journey))
        .route("/{journey_id}/open-map", post(open_map))
        .route("/{journey_id}/select-hotspot", post(select_hotspot))
        .route("/{journey_id}/explore-region", post(explore_region))
        .route("/{journey_id}/begin-story", post(begin_story))
        .route("/{journey_id}/select-choice", post(select_choice))
        .route("/{journey_id}/complete-story", post(complete_story))
        .route("/{journey_id}/view-impact", post(view_impact))
        .route("/{journey_id}/go-back", post(go_back))
        .route("/{journey_id}/reset", post(reset))
        .route("/{journey_id}/analytics", get(analytics))
}
