//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use donorpath_content::{ContentStore, LoadOptions};
use donorpath_core::clock::Clock;
use donorpath_core::rng::DeterministicRng;
use donorpath_event_store::InMemoryEventRepository;
use donorpath_test_support::{FixedClock, SequenceRng};
use http_body_util::BodyExt;
use tower::ServiceExt;

use donorpath_api::routes;
use donorpath_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build state over the bundled catalog with an in-memory event store and
/// deterministic Clock/RNG.
pub fn build_test_state() -> AppState {
    build_test_state_with_rng(SequenceRng::new(vec![0; 16]))
}

/// Like [`build_test_state`] with a custom `SequenceRng` for tests that pin
/// the donor message template.
pub fn build_test_state_with_rng(rng: SequenceRng) -> AppState {
    let content = ContentStore::bundled(LoadOptions::strict()).unwrap();
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(rng));
    AppState::new(
        Arc::new(content),
        fixed_clock(),
        rng,
        Arc::new(InMemoryEventRepository::new()),
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    routes::app(state)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Starts a journey and returns its id.
pub async fn start_journey(state: &AppState) -> String {
    let (status, json) = post_empty(build_test_app(state.clone()), "/api/v1/journeys").await;
    assert_eq!(status, StatusCode::CREATED);
    json["journey"]["journeyId"].as_str().unwrap().to_owned()
}
