//! Integration tests for the impact calculator routes.

mod common;

use axum::http::StatusCode;
use donorpath_test_support::SequenceRng;
use serde_json::json;

#[tokio::test]
async fn test_estimate_direct_tier() {
    let app = common::build_test_app(common::build_test_state());

    let (status, json) = common::post_json(
        app,
        "/api/v1/impact/estimate",
        &json!({ "donorName": "Wanjiru", "amount": 100 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["estimate"]["tier"], "direct");
    assert_eq!(json["estimate"]["students"], 1);
    assert_eq!(json["estimate"]["months"], 2);
    assert_eq!(json["estimate"]["donorName"], "Wanjiru");
}

#[tokio::test]
async fn test_estimate_message_follows_injected_rng() {
    let state = common::build_test_state_with_rng(SequenceRng::new(vec![1]));

    let (_, json) = common::post_json(
        common::build_test_app(state),
        "/api/v1/impact/estimate",
        &json!({ "donorName": "Wanjiru", "amount": 420 }),
    )
    .await;

    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("Dear Wanjiru, with your $420 contribution"));
    assert!(message.contains("12 months"));
}

#[tokio::test]
async fn test_estimate_with_negative_amount_is_rejected() {
    let app = common::build_test_app(common::build_test_state());

    let (status, json) = common::post_json(
        app,
        "/api/v1/impact/estimate",
        &json!({ "donorName": "Wanjiru", "amount": -5 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_amount");
}

#[tokio::test]
async fn test_donation_converts_the_journey_funnel() {
    // Arrange
    let state = common::build_test_state();
    let journey_id = common::start_journey(&state).await;

    // Act
    let (status, json) = common::post_json(
        common::build_test_app(state.clone()),
        "/api/v1/impact/donate",
        &json!({ "amount": 400, "donorName": "Wanjiru", "journeyId": journey_id }),
    )
    .await;
    let (_, analytics) = common::get_json(
        common::build_test_app(state),
        &format!("/api/v1/journeys/{journey_id}/analytics"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["url"],
        "https://www.kenyaeducationfund.org/donate?amount=400"
    );
    assert_eq!(analytics["funnel"]["converted"], true);
}

#[tokio::test]
async fn test_presets_are_ascending() {
    let app = common::build_test_app(common::build_test_state());

    let (status, json) = common::get_json(app, "/api/v1/impact/presets").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amounts"], json!([50, 100, 200, 400, 800]));
}
