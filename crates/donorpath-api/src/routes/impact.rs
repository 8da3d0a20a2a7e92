//! Routes for the impact calculator and donation hand-off.

use std::sync::PoisonError;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use donorpath_impact::{ImpactEstimate, PRESET_AMOUNTS, estimate, personalized_message};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /estimate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    /// Name used in the personalized message.
    #[serde(default)]
    pub donor_name: String,
    /// Donation in dollars.
    pub amount: f64,
    /// Journey to attribute the calculation to.
    #[serde(default)]
    pub journey_id: Option<Uuid>,
}

/// Response body for POST /estimate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    /// What the donation funds.
    pub estimate: ImpactEstimate,
    /// Thank-you message addressed to the donor.
    pub message: String,
}

/// Request body for POST /donate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonateRequest {
    /// Donation in dollars.
    pub amount: f64,
    /// Donor name, recorded with the intent.
    #[serde(default)]
    pub donor_name: String,
    /// Journey to attribute the intent to.
    #[serde(default)]
    pub journey_id: Option<Uuid>,
}

/// Response body for POST /donate.
#[derive(Debug, Serialize)]
pub struct DonateResponse {
    /// Link to the donation provider.
    pub url: String,
}

/// Response body for GET /presets.
#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    /// Suggested donation amounts, ascending.
    pub amounts: Vec<u32>,
}

/// GET /presets
async fn presets() -> Json<PresetsResponse> {
    Json(PresetsResponse {
        amounts: PRESET_AMOUNTS.to_vec(),
    })
}

/// POST /estimate
#[instrument(skip(state, request), fields(amount = request.amount))]
async fn estimate_impact(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let estimate = estimate(&request.donor_name, request.amount)?;

    if let Some(tracker) = request.journey_id.and_then(|id| state.tracker(id)) {
        tracker.track_impact_calculation(request.amount, !request.donor_name.trim().is_empty());
    }

    let message = {
        let mut rng = state.rng.lock().unwrap_or_else(PoisonError::into_inner);
        personalized_message(&estimate, &mut *rng)
    };

    info!(tier = ?estimate.tier, students = estimate.students, "impact estimated");

    Ok(Json(EstimateResponse { estimate, message }))
}

/// POST /donate
#[instrument(skip(state, request), fields(amount = request.amount))]
async fn donate(
    State(state): State<AppState>,
    Json(request): Json<DonateRequest>,
) -> Result<Json<DonateResponse>, ApiError> {
    let url = state.donation.link(request.amount)?;

    if let Some(tracker) = request.journey_id.and_then(|id| state.tracker(id)) {
        tracker.track_donation_intent(request.amount, request.donor_name.trim());
    }

    info!("donation hand-off issued");

    Ok(Json(DonateResponse { url }))
}

/// Returns the router for impact estimation.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/presets", get(presets))
        .route("/estimate", post(estimate_impact))
        .route("/donate", post(donate))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use donorpath_content::{ContentStore, LoadOptions};
    use donorpath_core::clock::Clock;
    use donorpath_core::rng::DeterministicRng;
    use donorpath_engagement::tracker::{DONATION_INTENT_EVENT, IMPACT_CALCULATED_EVENT};
    use donorpath_impact::DonationHandoff;
    use donorpath_test_support::{EmptyEventRepository, FixedClock, SequenceRng, fixed_now};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app_state(rng_values: Vec<u32>) -> AppState {
        let content = ContentStore::bundled(LoadOptions::default()).unwrap();
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock(fixed_now()));
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
            Arc::new(Mutex::new(SequenceRng::new(rng_values)));
        AppState::new(
            Arc::new(content),
            clock,
            rng,
            Arc::new(EmptyEventRepository),
        )
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_estimate_returns_tier_and_message() {
        // Arrange
        let app = router().with_state(app_state(vec![0]));

        // Act
        let (status, json) = post_json(
            app,
            "/estimate",
            json!({ "donorName": "Amina", "amount": 100 }),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["estimate"]["tier"], "direct");
        assert_eq!(json["estimate"]["months"], 2);
        assert_eq!(json["estimate"]["students"], 1);
        assert_eq!(json["estimate"]["location"], "Nairobi slums");
        assert!(json["message"].as_str().unwrap().contains("Amina"));
    }

    #[tokio::test]
    async fn test_estimate_rejects_non_positive_amount() {
        let app = router().with_state(app_state(vec![0]));

        let (status, json) =
            post_json(app, "/estimate", json!({ "donorName": "Amina", "amount": 0 })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid_amount");
    }

    #[tokio::test]
    async fn test_estimate_rejects_blank_name() {
        let app = router().with_state(app_state(vec![0]));

        let (status, json) =
            post_json(app, "/estimate", json!({ "donorName": "  ", "amount": 50 })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_estimate_and_donate_are_tracked_for_live_journey() {
        // Arrange
        let state = app_state(vec![1]);
        let journey_id = Uuid::new_v4();
        let tracker = state.open_tracker(journey_id, "impact_summary");

        // Act
        post_json(
            router().with_state(state.clone()),
            "/estimate",
            json!({ "donorName": "Amina", "amount": 200, "journeyId": journey_id }),
        )
        .await;
        let (status, json) = post_json(
            router().with_state(state),
            "/donate",
            json!({ "donorName": "Amina", "amount": 200, "journeyId": journey_id }),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["url"],
            "https://www.kenyaeducationfund.org/donate?amount=200"
        );
        let events: Vec<String> = tracker.events().into_iter().map(|e| e.event).collect();
        assert!(events.contains(&IMPACT_CALCULATED_EVENT.to_owned()));
        assert!(events.contains(&DONATION_INTENT_EVENT.to_owned()));
    }

    #[tokio::test]
    async fn test_rejected_estimate_is_not_tracked() {
        // Arrange
        let state = app_state(vec![0]);
        let journey_id = Uuid::new_v4();
        let tracker = state.open_tracker(journey_id, "impact_summary");

        // Act
        let (zero_status, _) = post_json(
            router().with_state(state.clone()),
            "/estimate",
            json!({ "donorName": "Amina", "amount": 0, "journeyId": journey_id }),
        )
        .await;
        let (blank_status, _) = post_json(
            router().with_state(state),
            "/estimate",
            json!({ "donorName": " ", "amount": 50, "journeyId": journey_id }),
        )
        .await;

        // Assert
        assert_eq!(zero_status, StatusCode::BAD_REQUEST);
        assert_eq!(blank_status, StatusCode::BAD_REQUEST);
        assert!(
            tracker
                .events()
                .iter()
                .all(|e| e.event != IMPACT_CALCULATED_EVENT)
        );
    }

    #[tokio::test]
    async fn test_donate_uses_configured_base_url() {
        let state = app_state(vec![0])
            .with_donation(DonationHandoff::parse("https://donate.example.org/give?campaign=kef").unwrap());
        let app = router().with_state(state);

        let (_, json) = post_json(app, "/donate", json!({ "amount": 50.5 })).await;

        assert_eq!(
            json["url"],
            "https://donate.example.org/give?campaign=kef&amount=50.5"
        );
    }
}
