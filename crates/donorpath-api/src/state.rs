//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use donorpath_content::ContentStore;
use donorpath_core::clock::Clock;
use donorpath_core::repository::EventRepository;
use donorpath_core::rng::DeterministicRng;
use donorpath_engagement::{Delivery, EngagementTracker};
use donorpath_impact::DonationHandoff;
use donorpath_journey::application::command_handlers;
use donorpath_journey::domain::commands::{EndJourney, EndReason};
use tracing::{info, warn};
use uuid::Uuid;

/// Engagement trackers by journey id.
pub type TrackerRegistry = Arc<RwLock<HashMap<Uuid, Arc<EngagementTracker>>>>;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The content catalog, loaded once at startup.
    pub content: Arc<ContentStore>,
    /// Time source for events and engagement records.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Picks cosmetic variants such as the donor message.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Journey event streams.
    pub event_repository: Arc<dyn EventRepository>,
    /// One tracker per live journey.
    pub trackers: TrackerRegistry,
    /// Forwarding to the analytics sink; records stay local when unset.
    pub delivery: Option<Delivery>,
    /// Builds donation links.
    pub donation: DonationHandoff,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("content_version", &self.content.version_hash())
            .field("forwarding", &self.delivery.is_some())
            .field("donation", &self.donation)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        content: Arc<ContentStore>,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        event_repository: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            content,
            clock,
            rng,
            event_repository,
            trackers: Arc::new(RwLock::new(HashMap::new())),
            delivery: None,
            donation: DonationHandoff::default(),
        }
    }

    /// Forwards engagement records through `delivery`.
    #[must_use]
    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    /// Links donations to `donation`'s page.
    #[must_use]
    pub fn with_donation(mut self, donation: DonationHandoff) -> Self {
        self.donation = donation;
        self
    }

    /// Creates and registers the tracker for a new journey.
    pub fn open_tracker(&self, journey_id: Uuid, initial_stage: &str) -> Arc<EngagementTracker> {
        let clock: Arc<dyn Clock> = self.clock.clone();
        let tracker = Arc::new(EngagementTracker::new(
            journey_id,
            initial_stage,
            clock,
            self.delivery.clone(),
        ));
        self.trackers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(journey_id, Arc::clone(&tracker));
        tracker
    }

    /// Unregisters a journey's tracker.
    pub fn close_tracker(&self, journey_id: Uuid) {
        self.trackers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&journey_id);
    }

    /// Ends every journey with nothing recorded for `max_idle`, dropping its
    /// tracker and stream. Returns how many were ended.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let max_idle_ms = u64::try_from(max_idle.as_millis()).unwrap_or(u64::MAX);
        let idle: Vec<(Uuid, Arc<EngagementTracker>)> = self
            .trackers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, tracker)| tracker.idle_millis() >= max_idle_ms)
            .map(|(id, tracker)| (*id, Arc::clone(tracker)))
            .collect();

        for (journey_id, tracker) in &idle {
            let command = EndJourney {
                correlation_id: Uuid::new_v4(),
                journey_id: *journey_id,
                reason: EndReason::Idle,
            };
            if let Err(e) = command_handlers::handle_end_journey(
                &command,
                &*self.event_repository,
                Some(tracker.as_ref()),
            )
            .await
            {
                warn!(%journey_id, error = %e, "idle journey stream not deleted");
            }
            self.close_tracker(*journey_id);
        }

        if !idle.is_empty() {
            info!(ended = idle.len(), "idle journeys evicted");
        }
        idle.len()
    }

    /// The tracker of a live journey, if it has one.
    #[must_use]
    pub fn tracker(&self, journey_id: Uuid) -> Option<Arc<EngagementTracker>> {
        self.trackers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&journey_id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use donorpath_content::LoadOptions;
    use donorpath_event_store::InMemoryEventRepository;
    use donorpath_journey::domain::commands::StartJourney;
    use donorpath_journey::domain::stage::Stage;
    use donorpath_test_support::{ManualClock, MockRng, fixed_now};

    fn state_with(clock: Arc<ManualClock>, repo: Arc<InMemoryEventRepository>) -> AppState {
        let content = ContentStore::bundled(LoadOptions::default()).unwrap();
        let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
        AppState::new(Arc::new(content), clock, rng, repo)
    }

    async fn start(state: &AppState) -> Uuid {
        let command = StartJourney {
            correlation_id: Uuid::new_v4(),
            journey_id: Uuid::new_v4(),
        };
        let tracker = state.open_tracker(command.journey_id, Stage::Intro.as_str());
        command_handlers::handle_start_journey(
            &command,
            state.clock.as_ref(),
            &*state.event_repository,
            Some(tracker.as_ref()),
        )
        .await
        .unwrap();
        command.journey_id
    }

    #[tokio::test]
    async fn test_evict_idle_ends_only_quiet_journeys() {
        // Arrange
        let clock = Arc::new(ManualClock::starting_at(fixed_now()));
        let repo = Arc::new(InMemoryEventRepository::new());
        let state = state_with(clock.clone(), repo.clone());
        let quiet = start(&state).await;
        clock.advance_millis(20 * 60 * 1_000);
        let active = start(&state).await;
        clock.advance_millis(15 * 60 * 1_000);

        // Act
        let ended = state.evict_idle(Duration::from_secs(30 * 60)).await;

        // Assert
        assert_eq!(ended, 1);
        assert!(state.tracker(quiet).is_none());
        assert!(state.tracker(active).is_some());
        assert_eq!(repo.stream_count().unwrap(), 1);
        assert!(repo.load_events(quiet).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_evict_idle_with_nothing_idle_keeps_everything() {
        let clock = Arc::new(ManualClock::starting_at(fixed_now()));
        let repo = Arc::new(InMemoryEventRepository::new());
        let state = state_with(clock, repo.clone());
        let journey_id = start(&state).await;

        let ended = state.evict_idle(Duration::from_secs(60)).await;

        assert_eq!(ended, 0);
        assert!(state.tracker(journey_id).is_some());
        assert_eq!(repo.stream_count().unwrap(), 1);
    }
}
