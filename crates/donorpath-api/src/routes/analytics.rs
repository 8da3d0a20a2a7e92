//! Ingestion of engagement records sent by clients.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use donorpath_core::engagement::EngagementRecord;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::state::AppState;

/// Response body for POST /api/analytics.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Whether the record was kept. Records are best-effort; `false` means
    /// it was dropped, never that the request failed.
    pub accepted: bool,
}

/// POST /api/analytics
///
/// Records for a live journey join that journey's log. Anything else goes
/// straight to the sink.
#[instrument(skip(state, record), fields(event = %record.event, session_id = %record.session_id))]
async fn ingest(
    State(state): State<AppState>,
    Json(record): Json<EngagementRecord>,
) -> (StatusCode, Json<IngestResponse>) {
    let accepted = if let Some(tracker) = state.tracker(record.session_id) {
        tracker.record(&record.event, record.data);
        true
    } else if let Some(delivery) = &state.delivery {
        delivery.offer(record)
    } else {
        debug!("no sink configured; client record dropped");
        false
    };

    (StatusCode::ACCEPTED, Json(IngestResponse { accepted }))
}

/// Returns the analytics ingestion router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/analytics", post(ingest))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use donorpath_content::{ContentStore, LoadOptions};
    use donorpath_core::clock::Clock;
    use donorpath_core::rng::DeterministicRng;
    use donorpath_engagement::Delivery;
    use donorpath_test_support::{EmptyEventRepository, FixedClock, MockRng, RecordingSink, fixed_now};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app_state() -> AppState {
        let content = ContentStore::bundled(LoadOptions::default()).unwrap();
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock(fixed_now()));
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
        AppState::new(
            Arc::new(content),
            clock,
            rng,
            Arc::new(EmptyEventRepository),
        )
    }

    fn record_body(session_id: Uuid) -> Value {
        json!({
            "event": "map_hotspot_hovered",
            "stage": "map_overview",
            "timestamp": "2026-01-15T10:00:00Z",
            "sessionId": session_id,
            "data": { "hotspot_id": "kibera" }
        })
    }

    async fn post_record(app: Router, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analytics")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn test_record_for_live_journey_joins_its_log() {
        // Arrange
        let state = app_state();
        let journey_id = Uuid::new_v4();
        let tracker = state.open_tracker(journey_id, "intro");

        // Act
        let (status, json) = post_record(router().with_state(state), &record_body(journey_id)).await;

        // Assert
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["accepted"], true);
        let events = tracker.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event, "map_hotspot_hovered");
        assert_eq!(events[1].stage, "intro");
        assert_eq!(events[1].data["hotspot_id"], "kibera");
    }

    #[tokio::test]
    async fn test_record_without_journey_is_forwarded_to_sink() {
        // Arrange
        let sink = Arc::new(RecordingSink::new());
        let (delivery, worker) = Delivery::spawn(sink.clone(), 8);
        let state = app_state().with_delivery(delivery);

        // Act
        let (status, json) =
            post_record(router().with_state(state), &record_body(Uuid::new_v4())).await;
        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .unwrap()
            .unwrap();

        // Assert
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["accepted"], true);
        assert_eq!(sink.received().len(), 1);
        assert_eq!(sink.received()[0].event, "map_hotspot_hovered");
    }

    #[tokio::test]
    async fn test_record_without_sink_is_dropped_not_rejected() {
        let (status, json) =
            post_record(router().with_state(app_state()), &record_body(Uuid::new_v4())).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["accepted"], false);
    }
}
