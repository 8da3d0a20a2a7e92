//! Per-session engagement log.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use donorpath_core::clock::Clock;
use donorpath_core::engagement::EngagementRecord;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::analytics::{ConversionFunnel, JourneyAnalytics};
use crate::delivery::Delivery;

/// Recorded once when a tracker is created.
pub const SESSION_STARTED_EVENT: &str = "session_started";
/// Recorded when the visitor leaves a stage.
pub const STAGE_COMPLETED_EVENT: &str = "stage_completed";
/// Recorded when the visitor enters a stage.
pub const STAGE_STARTED_EVENT: &str = "stage_started";
/// Recorded for every story choice.
pub const STORY_CHOICE_EVENT: &str = "story_choice_selected";
/// Recorded when an impact estimate is requested.
pub const IMPACT_CALCULATED_EVENT: &str = "impact_calculated";
/// Recorded when the visitor is handed off to the donation provider.
pub const DONATION_INTENT_EVENT: &str = "donation_intent";
/// Recorded when a session is closed or evicted for inactivity.
pub const SESSION_ENDED_EVENT: &str = "session_ended";

#[derive(Debug)]
struct TrackerState {
    stage: String,
    stage_started_at: DateTime<Utc>,
    events: Vec<EngagementRecord>,
}

/// Append-only engagement log for one session.
///
/// Every method takes `&self` and none of them can fail: records always land
/// in the local log, and forwarding to the sink is a non-blocking offer.
pub struct EngagementTracker {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    clock: Arc<dyn Clock>,
    delivery: Option<Delivery>,
    state: Mutex<TrackerState>,
}

impl std::fmt::Debug for EngagementTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementTracker")
            .field("session_id", &self.session_id)
            .field("started_at", &self.started_at)
            .field("forwarding", &self.delivery.is_some())
            .finish_non_exhaustive()
    }
}

impl EngagementTracker {
    /// Starts tracking a session in `initial_stage` and records
    /// `session_started`. Without a `delivery` the log stays local.
    pub fn new(
        session_id: Uuid,
        initial_stage: &str,
        clock: Arc<dyn Clock>,
        delivery: Option<Delivery>,
    ) -> Self {
        let started_at = clock.now();
        let tracker = Self {
            session_id,
            started_at,
            clock,
            delivery,
            state: Mutex::new(TrackerState {
                stage: initial_stage.to_owned(),
                stage_started_at: started_at,
                events: Vec::new(),
            }),
        };
        tracker.record(SESSION_STARTED_EVENT, Map::new());
        tracker
    }

    /// The tracked session.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Appends a record in the current stage and offers it to the sink.
    pub fn record(&self, event: &str, data: Map<String, Value>) {
        let record = {
            let mut state = self.state();
            let record = EngagementRecord {
                event: event.to_owned(),
                stage: state.stage.clone(),
                timestamp: self.clock.now(),
                session_id: self.session_id,
                data,
            };
            state.events.push(record.clone());
            record
        };

        if let Some(delivery) = &self.delivery {
            delivery.offer(record);
        }
    }

    /// Like [`EngagementTracker::record`] for arbitrary JSON; non-object
    /// values are wrapped as `{ "value": ... }`.
    pub fn record_value(&self, event: &str, data: Value) {
        let data = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_owned(), other);
                map
            }
        };
        self.record(event, data);
    }

    /// Records leaving the current stage and entering `stage`. Moving to the
    /// stage the session is already in records nothing.
    pub fn move_to_stage(&self, stage: &str) {
        let (previous, time_in_stage) = {
            let state = self.state();
            if state.stage == stage {
                return;
            }
            (
                state.stage.clone(),
                self.clock.millis_since(state.stage_started_at),
            )
        };

        self.record_value(
            STAGE_COMPLETED_EVENT,
            json!({
                "from_stage": previous,
                "to_stage": stage,
                "time_in_stage_ms": time_in_stage,
            }),
        );

        {
            let mut state = self.state();
            state.stage = stage.to_owned();
            state.stage_started_at = self.clock.now();
        }

        self.record_value(STAGE_STARTED_EVENT, json!({ "stage": stage }));
    }

    /// Records a story choice.
    pub fn track_story_choice(&self, choice_id: &str, choice_text: &str, scene_id: &str) {
        self.record_value(
            STORY_CHOICE_EVENT,
            json!({
                "choice_id": choice_id,
                "choice_text": choice_text,
                "scene_id": scene_id,
            }),
        );
    }

    /// Records an impact calculation.
    pub fn track_impact_calculation(&self, amount: f64, has_donor_name: bool) {
        let since_stage_start = self.clock.millis_since(self.state().stage_started_at);
        self.record_value(
            IMPACT_CALCULATED_EVENT,
            json!({
                "amount": amount,
                "has_donor_name": has_donor_name,
                "calculation_time_ms": since_stage_start,
            }),
        );
    }

    /// Records the hand-off to the donation provider.
    pub fn track_donation_intent(&self, amount: f64, donor_name: &str) {
        self.record_value(
            DONATION_INTENT_EVENT,
            json!({
                "amount": amount,
                "donor_name": donor_name,
                "journey_duration_ms": self.clock.millis_since(self.started_at),
            }),
        );
    }

    /// Records the end of the session; `reason` says who ended it.
    pub fn end_session(&self, reason: &str) {
        self.record_value(
            SESSION_ENDED_EVENT,
            json!({
                "reason": reason,
                "journey_duration_ms": self.clock.millis_since(self.started_at),
            }),
        );
    }

    /// Milliseconds since the last record.
    #[must_use]
    pub fn idle_millis(&self) -> u64 {
        let last = self
            .state()
            .events
            .last()
            .map_or(self.started_at, |record| record.timestamp);
        self.clock.millis_since(last)
    }

    /// The stage label records are currently tagged with.
    #[must_use]
    pub fn current_stage(&self) -> String {
        self.state().stage.clone()
    }

    /// A copy of every record so far.
    #[must_use]
    pub fn events(&self) -> Vec<EngagementRecord> {
        self.state().events.clone()
    }

    /// Snapshot of the whole session.
    #[must_use]
    pub fn journey_analytics(&self) -> JourneyAnalytics {
        let state = self.state();
        JourneyAnalytics {
            session_id: self.session_id,
            start_time: self.started_at,
            current_stage: state.stage.clone(),
            events: state.events.clone(),
        }
    }

    /// Per-stage counts and conversion flag.
    #[must_use]
    pub fn conversion_funnel(&self) -> ConversionFunnel {
        let state = self.state();
        ConversionFunnel::from_records(&state.events, self.clock.millis_since(self.started_at))
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use donorpath_test_support::{
        FailingSink, FixedClock, ManualClock, RecordingSink, StallingSink, fixed_now,
    };

    fn local_tracker() -> EngagementTracker {
        EngagementTracker::new(Uuid::new_v4(), "intro", Arc::new(FixedClock(fixed_now())), None)
    }

    #[test]
    fn test_new_tracker_records_session_started() {
        let tracker = local_tracker();

        let events = tracker.events();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, SESSION_STARTED_EVENT);
        assert_eq!(events[0].stage, "intro");
        assert_eq!(events[0].session_id, tracker.session_id());
    }

    #[test]
    fn test_move_to_stage_records_completion_and_start() {
        // Arrange
        let clock = Arc::new(ManualClock::starting_at(fixed_now()));
        let tracker = EngagementTracker::new(Uuid::new_v4(), "intro", clock.clone(), None);
        clock.advance_millis(1_500);

        // Act
        tracker.move_to_stage("map_overview");

        // Assert
        let events = tracker.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].event, STAGE_COMPLETED_EVENT);
        assert_eq!(events[1].stage, "intro");
        assert_eq!(events[1].data["time_in_stage_ms"], 1_500);
        assert_eq!(events[2].event, STAGE_STARTED_EVENT);
        assert_eq!(events[2].stage, "map_overview");
        assert_eq!(tracker.current_stage(), "map_overview");
    }

    #[test]
    fn test_move_to_same_stage_records_nothing() {
        let tracker = local_tracker();

        tracker.move_to_stage("intro");

        assert_eq!(tracker.events().len(), 1);
    }

    #[test]
    fn test_record_value_wraps_scalars() {
        let tracker = local_tracker();

        tracker.record_value("scroll_depth", json!(75));

        let last = tracker.events().pop().unwrap();
        assert_eq!(last.data["value"], 75);
    }

    #[test]
    fn test_conversion_funnel_counts_per_stage() {
        // Arrange
        let tracker = local_tracker();
        tracker.track_story_choice("c1", "Apply", "s1");
        tracker.move_to_stage("impact_summary");
        tracker.track_donation_intent(100.0, "Ada");

        // Act
        let funnel = tracker.conversion_funnel();

        // Assert
        assert_eq!(funnel.events_per_stage["intro"], 3);
        assert_eq!(funnel.events_per_stage["impact_summary"], 2);
        assert!(funnel.converted);
    }

    #[test]
    fn test_journey_analytics_snapshot() {
        let tracker = local_tracker();
        tracker.track_impact_calculation(250.0, true);

        let analytics = tracker.journey_analytics();

        assert_eq!(analytics.session_id, tracker.session_id());
        assert_eq!(analytics.start_time, fixed_now());
        assert_eq!(analytics.events.len(), 2);
        assert_eq!(analytics.events[1].event, IMPACT_CALCULATED_EVENT);
    }

    #[test]
    fn test_idle_time_counts_from_last_record() {
        // Arrange
        let clock = Arc::new(ManualClock::starting_at(fixed_now()));
        let tracker = EngagementTracker::new(Uuid::new_v4(), "intro", clock.clone(), None);
        clock.advance_millis(4_000);
        tracker.move_to_stage("map_overview");

        // Act
        clock.advance_millis(2_500);

        // Assert
        assert_eq!(tracker.idle_millis(), 2_500);
    }

    #[test]
    fn test_end_session_records_reason_and_duration() {
        let clock = Arc::new(ManualClock::starting_at(fixed_now()));
        let tracker = EngagementTracker::new(Uuid::new_v4(), "intro", clock.clone(), None);
        clock.advance_millis(9_000);

        tracker.end_session("closed");

        let last = tracker.events().pop().unwrap();
        assert_eq!(last.event, SESSION_ENDED_EVENT);
        assert_eq!(last.data["reason"], "closed");
        assert_eq!(last.data["journey_duration_ms"], 9_000);
        assert_eq!(tracker.idle_millis(), 0);
    }

    #[tokio::test]
    async fn test_records_reach_sink() {
        // Arrange
        let sink = Arc::new(RecordingSink::new());
        let (delivery, worker) = Delivery::spawn(sink.clone(), 16);
        let tracker = EngagementTracker::new(
            Uuid::new_v4(),
            "intro",
            Arc::new(FixedClock(fixed_now())),
            Some(delivery.clone()),
        );

        // Act
        tracker.track_story_choice("c1", "Apply", "s1");
        drop(tracker);
        drop(delivery);
        worker.await.unwrap();

        // Assert
        let received = sink.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].event, STORY_CHOICE_EVENT);
    }

    #[tokio::test]
    async fn test_failing_sink_never_reaches_caller() {
        // Arrange
        let (delivery, worker) = Delivery::spawn(Arc::new(FailingSink), 16);
        let tracker = EngagementTracker::new(
            Uuid::new_v4(),
            "intro",
            Arc::new(FixedClock(fixed_now())),
            Some(delivery.clone()),
        );

        // Act
        tracker.move_to_stage("map_overview");
        drop(delivery);

        // Assert
        assert_eq!(tracker.events().len(), 3);
        drop(tracker);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_stalled_sink_does_not_block_recording() {
        // Arrange
        let (delivery, _worker) =
            Delivery::spawn(Arc::new(StallingSink(Duration::from_secs(60))), 2);
        let tracker = EngagementTracker::new(
            Uuid::new_v4(),
            "intro",
            Arc::new(FixedClock(fixed_now())),
            Some(delivery),
        );

        // Act
        let recorded = tokio::time::timeout(Duration::from_secs(1), async {
            for i in 0..100 {
                tracker.record_value("tick", json!({ "i": i }));
            }
        })
        .await;

        // Assert
        assert!(recorded.is_ok());
        assert_eq!(tracker.events().len(), 101);
    }
}
