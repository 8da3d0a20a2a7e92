//! Integration tests for the journey state machine routes.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_full_journey_through_silvia_story() {
    let state = common::build_test_state();
    let journey_id = common::start_journey(&state).await;
    let base = format!("/api/v1/journeys/{journey_id}");
    let app = || common::build_test_app(state.clone());

    // Intro -> MapOverview -> StorySelection
    let (status, _) = common::post_empty(app(), &format!("{base}/open-map")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = common::post_json(
        app(),
        &format!("{base}/select-hotspot"),
        &json!({ "hotspotId": "nairobi" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["journey"]["stage"], "story_selection");
    assert_eq!(json["journey"]["selectedHotspot"]["id"], "nairobi");

    // Scenario 1: the entry scene at 25%.
    let (status, json) = common::post_json(
        app(),
        &format!("{base}/begin-story"),
        &json!({ "storyId": "silvia-story" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["journey"]["stage"], "story_experience");
    assert_eq!(json["journey"]["progressPercent"], 25.0);
    assert_eq!(json["journey"]["currentScene"]["sceneId"], "silvia-start");

    let path = [
        ("silvia-start", "silvia-visit-teacher"),
        ("silvia-mentor", "silvia-apply-mentor"),
        ("silvia-scholarship", "silvia-study-hard"),
    ];
    let mut last_progress = 25.0;
    for (scene_id, choice_id) in path {
        let (status, json) = common::post_json(
            app(),
            &format!("{base}/select-choice"),
            &json!({ "choiceId": choice_id, "sceneId": scene_id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let progress = json["journey"]["progressPercent"].as_f64().unwrap();
        assert!(progress >= last_progress);
        last_progress = progress;
    }
    assert!((last_progress - 100.0).abs() < f64::EPSILON);

    let (status, json) = common::post_empty(app(), &format!("{base}/complete-story")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["journey"]["stage"], "connections");
    assert_eq!(json["journey"]["completedStories"], json!(["silvia-story"]));
    assert_eq!(json["journey"]["visitedRegions"], json!(["nairobi"]));
    assert!(json["journey"]["currentScene"].is_null());

    let (status, json) = common::post_empty(app(), &format!("{base}/view-impact")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["journey"]["stage"], "impact_summary");
    assert_eq!(json["journey"]["journeyProgress"], 100);
    assert_eq!(json["journey"]["impactPoints"], 110);
    assert_eq!(json["journey"]["impactGrade"], "good");

    // Persisted state matches the last response.
    let (status, json) = common::get_json(app(), &base).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], 9);
}

#[tokio::test]
async fn test_stale_choice_is_rejected_without_a_second_transition() {
    // Arrange
    let state = common::build_test_state();
    let journey_id = common::start_journey(&state).await;
    let base = format!("/api/v1/journeys/{journey_id}");
    let app = || common::build_test_app(state.clone());
    common::post_empty(app(), &format!("{base}/open-map")).await;
    common::post_json(
        app(),
        &format!("{base}/begin-story"),
        &json!({ "storyId": "silvia-story" }),
    )
    .await;
    let body = json!({ "choiceId": "silvia-visit-teacher", "sceneId": "silvia-start" });

    // Act
    let (first, _) = common::post_json(app(), &format!("{base}/select-choice"), &body).await;
    let (second, json) = common::post_json(app(), &format!("{base}/select-choice"), &body).await;

    // Assert
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(json["error"], "stale_intent");

    let (_, journey) = common::get_json(app(), &base).await;
    assert_eq!(journey["currentScene"]["sceneId"], "silvia-mentor");
    assert_eq!(journey["choiceHistory"], json!(["silvia-visit-teacher"]));
}

#[tokio::test]
async fn test_view_impact_from_intro_returns_409() {
    let state = common::build_test_state();
    let journey_id = common::start_journey(&state).await;

    let (status, json) = common::post_empty(
        common::build_test_app(state),
        &format!("/api/v1/journeys/{journey_id}/view-impact"),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "invalid_transition");
}

#[tokio::test]
async fn test_unknown_hotspot_returns_404_and_keeps_stage() {
    let state = common::build_test_state();
    let journey_id = common::start_journey(&state).await;
    let base = format!("/api/v1/journeys/{journey_id}");
    common::post_empty(common::build_test_app(state.clone()), &format!("{base}/open-map")).await;

    let (status, json) = common::post_json(
        common::build_test_app(state.clone()),
        &format!("{base}/select-hotspot"),
        &json!({ "hotspotId": "atlantis" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
    let (_, journey) = common::get_json(common::build_test_app(state), &base).await;
    assert_eq!(journey["stage"], "map_overview");
}

#[tokio::test]
async fn test_go_back_and_reset() {
    let state = common::build_test_state();
    let journey_id = common::start_journey(&state).await;
    let base = format!("/api/v1/journeys/{journey_id}");
    let app = || common::build_test_app(state.clone());
    common::post_empty(app(), &format!("{base}/open-map")).await;
    common::post_json(
        app(),
        &format!("{base}/begin-story"),
        &json!({ "storyId": "silvia-story" }),
    )
    .await;

    let (status, json) = common::post_empty(app(), &format!("{base}/go-back")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["journey"]["stage"], "story_selection");
    assert!(json["journey"]["selectedStory"].is_null());
    assert!(json["journey"]["currentScene"].is_null());

    let (status, json) = common::post_empty(app(), &format!("{base}/reset")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["journey"]["stage"], "intro");
    assert_eq!(json["journey"]["journeyProgress"], 10);
}

#[tokio::test]
async fn test_abandoned_hotspot_is_not_credited_to_another_story() {
    let state = common::build_test_state();
    let journey_id = common::start_journey(&state).await;
    let base = format!("/api/v1/journeys/{journey_id}");
    let app = || common::build_test_app(state.clone());
    common::post_empty(app(), &format!("{base}/open-map")).await;
    common::post_json(
        app(),
        &format!("{base}/select-hotspot"),
        &json!({ "hotspotId": "nairobi" }),
    )
    .await;
    let (_, json) = common::post_empty(app(), &format!("{base}/go-back")).await;
    assert_eq!(json["journey"]["stage"], "map_overview");

    common::post_json(
        app(),
        &format!("{base}/begin-story"),
        &json!({ "storyId": "sawa-story" }),
    )
    .await;
    for (scene_id, choice_id) in [("sawa-start", "sawa-walk"), ("sawa-journey", "sawa-boarding")] {
        let (status, _) = common::post_json(
            app(),
            &format!("{base}/select-choice"),
            &json!({ "choiceId": choice_id, "sceneId": scene_id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, json) = common::post_empty(app(), &format!("{base}/complete-story")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["journey"]["completedStories"], json!(["sawa-story"]));
    assert_eq!(json["journey"]["visitedRegions"], json!([]));
}

#[tokio::test]
async fn test_get_nonexistent_journey_returns_404() {
    let app = common::build_test_app(common::build_test_state());

    let (status, json) = common::get_json(
        app,
        "/api/v1/journeys/00000000-0000-0000-0000-000000000000",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "aggregate_not_found");
}

#[tokio::test]
async fn test_journey_analytics_follow_stages() {
    let state = common::build_test_state();
    let journey_id = common::start_journey(&state).await;
    let base = format!("/api/v1/journeys/{journey_id}");
    common::post_empty(common::build_test_app(state.clone()), &format!("{base}/open-map")).await;

    let (status, json) =
        common::get_json(common::build_test_app(state), &format!("{base}/analytics")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["journey"]["sessionId"], journey_id);
    assert_eq!(json["journey"]["currentStage"], "map_overview");
    let events: Vec<&str> = json["journey"]["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event"].as_str().unwrap())
        .collect();
    assert_eq!(
        events,
        vec![
            "session_started",
            "journey.started",
            "journey.map_opened",
            "stage_completed",
            "stage_started",
        ]
    );
    assert_eq!(json["funnel"]["converted"], false);
}
