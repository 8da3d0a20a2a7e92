//! DonorPath API server entry point.

use std::sync::{Arc, Mutex};

use donorpath_api::config::ServerConfig;
use donorpath_api::error::AppError;
use donorpath_api::routes;
use donorpath_api::state::AppState;
use donorpath_core::clock::{Clock, SystemClock};
use donorpath_core::engagement::EngagementSink;
use donorpath_core::rng::{DeterministicRng, SeededRng};
use donorpath_engagement::delivery::DEFAULT_QUEUE_CAPACITY;
use donorpath_engagement::{Delivery, HttpSink, LogSink};
use donorpath_event_store::InMemoryEventRepository;
use donorpath_impact::DonationHandoff;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting DonorPath API server");

    let config = ServerConfig::from_env()?;
    let content = config.load_content()?;
    tracing::info!(
        stories = content.list_stories().len(),
        hotspots = content.list_hotspots().len(),
        content_version = %content.version_hash(),
        "content catalog loaded"
    );

    // Engagement records are forwarded by a background worker.
    let sink: Arc<dyn EngagementSink> = match &config.analytics_endpoint {
        Some(endpoint) => Arc::new(HttpSink::new(endpoint.as_str()).map_err(|e| {
            AppError::Config(format!("failed to build analytics client: {e}"))
        })?),
        None => Arc::new(LogSink),
    };
    let (delivery, _worker) = Delivery::spawn(sink, DEFAULT_QUEUE_CAPACITY);

    // Build application state.
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SeededRng::from_entropy()));
    let app_state = AppState::new(
        Arc::new(content),
        clock,
        rng,
        Arc::new(InMemoryEventRepository::new()),
    )
    .with_delivery(delivery)
    .with_donation(DonationHandoff::new(config.donate_url.clone()));

    // Abandoned journeys are ended so their tracker and stream are freed.
    let sweep_state = app_state.clone();
    let idle_timeout = config.session_idle_timeout;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(idle_timeout / 4);
        loop {
            ticker.tick().await;
            sweep_state.evict_idle(idle_timeout).await;
        }
    });

    // TODO: Replace CorsLayer::permissive() with the site's origin once it is configurable.
    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
