//! Read-only routes over the content catalog.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use donorpath_content::domain::validation::GraphDefect;
use donorpath_content::{MapHotspot, Story};
use serde::Serialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for GET /stories.
#[derive(Debug, Serialize)]
pub struct StoriesResponse {
    /// Every story, in catalog order.
    pub stories: Vec<Story>,
}

/// Response body for GET /hotspots.
#[derive(Debug, Serialize)]
pub struct HotspotsResponse {
    /// Every hotspot, in catalog order.
    pub hotspots: Vec<MapHotspot>,
}

/// Response body for GET /audit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    /// Hash of the catalog that was audited.
    pub version_hash: String,
    /// Every dangling choice.
    pub defects: Vec<GraphDefect>,
}

/// GET /stories
async fn list_stories(State(state): State<AppState>) -> Json<StoriesResponse> {
    Json(StoriesResponse {
        stories: state.content.list_stories().to_vec(),
    })
}

/// GET /stories/{story_id}
#[instrument(skip(state))]
async fn get_story(
    State(state): State<AppState>,
    Path(story_id): Path<String>,
) -> Result<Json<Story>, ApiError> {
    let story = state.content.get_story_by_id(&story_id)?;
    Ok(Json(story.clone()))
}

/// GET /hotspots
async fn list_hotspots(State(state): State<AppState>) -> Json<HotspotsResponse> {
    Json(HotspotsResponse {
        hotspots: state.content.list_hotspots().to_vec(),
    })
}

/// GET /audit
async fn audit(State(state): State<AppState>) -> Json<AuditResponse> {
    Json(AuditResponse {
        version_hash: state.content.version_hash().to_owned(),
        defects: state.content.audit_graph(),
    })
}

/// Returns the router for the content catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stories", get(list_stories))
        .route("/stories/{story_id}", get(get_story))
        .route("/hotspots", get(list_hotspots))
        .route("/audit", get(audit))
}
