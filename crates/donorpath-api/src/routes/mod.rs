//! Route modules organized by concern.

use axum::Router;

use crate::state::AppState;

pub mod analytics;
pub mod content;
pub mod health;
pub mod impact;
pub mod journeys;

/// Every route, mounted at its public path.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(analytics::router())
        .nest("/api/v1/content", content::router())
        .nest("/api/v1/journeys", journeys::router())
        .nest("/api/v1/impact", impact::router())
        .with_state(state)
}
