//! Command handlers for journeys.
//!
//! Each handler loads the journey's stream, reconstitutes the aggregate,
//! executes one intent, appends the resulting events with the version it
//! loaded, and then copies those events into the engagement tracker.
//! Tracking happens after the append and cannot fail the intent.

use donorpath_content::ContentStore;
use donorpath_core::aggregate::AggregateRoot;
use donorpath_core::clock::Clock;
use donorpath_core::command::Command;
use donorpath_core::error::DomainError;
use donorpath_core::repository::{EventRepository, StoredEvent};
use donorpath_engagement::EngagementTracker;
use tracing::info;
use uuid::Uuid;

use crate::domain::aggregates::JourneySession;
use crate::domain::commands::{
    BeginStory, CompleteStory, EndJourney, ExploreRegion, GoBack, OpenMap, ResetJourney,
    SelectChoice, SelectHotspot, StartJourney, ViewImpactSummary,
};
use crate::domain::events::{JourneyEvent, JourneyEventKind};

/// Reconstitutes a `JourneySession` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if event deserialization fails.
pub(crate) fn reconstitute(
    journey_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<JourneySession, DomainError> {
    let mut session = JourneySession::new(journey_id);
    for stored in existing_events {
        let kind: JourneyEventKind =
            serde_json::from_value(stored.payload.clone()).map_err(|e| {
                DomainError::Infrastructure(format!("event deserialization failed: {e}"))
            })?;
        let event = JourneyEvent {
            metadata: stored.metadata(),
            kind,
        };
        session.apply(&event);
    }
    Ok(session)
}

/// Loads a journey that must already have been started.
pub(crate) async fn load_journey(
    journey_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<JourneySession, DomainError> {
    let existing_events = repo.load_events(journey_id).await?;
    if existing_events.is_empty() {
        return Err(DomainError::AggregateNotFound(journey_id));
    }
    reconstitute(journey_id, &existing_events)
}

async fn persist(
    session: &mut JourneySession,
    command: &dyn Command,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored_events = append(session, command, repo).await?;

    if let Some(tracker) = tracker {
        record_events(tracker, &stored_events);
        tracker.move_to_stage(session.stage().as_str());
    }

    Ok(stored_events)
}

async fn append(
    session: &mut JourneySession,
    command: &dyn Command,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored_events: Vec<StoredEvent> = session
        .uncommitted_events()
        .iter()
        .map(StoredEvent::from_domain_event)
        .collect();

    if !stored_events.is_empty() {
        repo.append_events(session.id, session.version(), &stored_events)
            .await?;
    }
    session.clear_uncommitted_events();

    info!(
        journey_id = %session.id,
        correlation_id = %command.correlation_id(),
        intent = command.command_type(),
        stage = %session.stage(),
        events = stored_events.len(),
        "intent accepted"
    );

    Ok(stored_events)
}

fn record_events(tracker: &EngagementTracker, stored_events: &[StoredEvent]) {
    for stored in stored_events {
        tracker.record_value(&stored.event_type, stored.payload.clone());
    }
}

/// Handles the `StartJourney` command: creates the journey on the intro
/// screen.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` if the journey already exists,
/// or `DomainError` if event loading or appending fails.
pub async fn handle_start_journey(
    command: &StartJourney,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let existing_events = repo.load_events(command.journey_id).await?;
    let mut session = reconstitute(command.journey_id, &existing_events)?;

    session.start(command.correlation_id, clock)?;

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `OpenMap` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown journey,
/// `DomainError::InvalidTransition` if the stage does not allow it, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_open_map(
    command: &OpenMap,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;

    session.open_map(command.correlation_id, clock)?;

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `SelectHotspot` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown hotspot, plus the errors
/// of [`handle_open_map`].
pub async fn handle_select_hotspot(
    command: &SelectHotspot,
    content: &ContentStore,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;

    session.select_hotspot(&command.hotspot_id, content, command.correlation_id, clock)?;

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `ExploreRegion` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if no hotspot is selected, plus the
/// errors of [`handle_open_map`].
pub async fn handle_explore_region(
    command: &ExploreRegion,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;

    session.explore_region(command.correlation_id, clock)?;

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `BeginStory` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown story, plus the errors of
/// [`handle_open_map`].
pub async fn handle_begin_story(
    command: &BeginStory,
    content: &ContentStore,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;

    session.begin_story(&command.story_id, content, command.correlation_id, clock)?;

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `SelectChoice` command and tracks the choice taken.
///
/// # Errors
///
/// Returns `DomainError::StaleIntent`, `DomainError::NotFound` or
/// `DomainError::BrokenContentGraph` as described on
/// [`JourneySession::select_choice`], plus the errors of
/// [`handle_open_map`].
pub async fn handle_select_choice(
    command: &SelectChoice,
    content: &ContentStore,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;
    let story_id = session.selected_story_id().map(str::to_owned);
    let scene_id = session.current_scene_id().map(str::to_owned);

    session.select_choice(
        &command.choice_id,
        command.scene_id.as_deref(),
        content,
        command.correlation_id,
        clock,
    )?;

    let stored_events = append(&mut session, command, repo).await?;

    // Choices are recorded in the stage they were taken in.
    if let Some(tracker) = tracker {
        record_events(tracker, &stored_events);
        if let (Some(story_id), Some(scene_id)) = (story_id, scene_id) {
            let choice_text = content
                .get_story_by_id(&story_id)
                .ok()
                .and_then(|story| story.scene(&scene_id))
                .and_then(|scene| scene.choice(&command.choice_id))
                .map_or("", |choice| choice.text.as_str());
            tracker.track_story_choice(&command.choice_id, choice_text, &scene_id);
        }
        tracker.move_to_stage(session.stage().as_str());
    }

    Ok(stored_events)
}

/// Handles the `CompleteStory` command.
///
/// # Errors
///
/// Returns `DomainError::InvalidTransition` unless the current scene is an
/// ending, plus the errors of [`handle_open_map`].
pub async fn handle_complete_story(
    command: &CompleteStory,
    content: &ContentStore,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;

    session.complete_story(content, command.correlation_id, clock)?;

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `ViewImpactSummary` command.
///
/// # Errors
///
/// Returns the errors of [`handle_open_map`].
pub async fn handle_view_impact_summary(
    command: &ViewImpactSummary,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;

    session.view_impact_summary(command.correlation_id, clock)?;

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `GoBack` command. Stepping back on the intro screen persists
/// nothing.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` for an unknown journey, or
/// `DomainError` if event loading or appending fails.
pub async fn handle_go_back(
    command: &GoBack,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;

    session.go_back(command.correlation_id, clock);

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `ResetJourney` command.
///
/// # Errors
///
/// Returns the errors of [`handle_go_back`].
pub async fn handle_reset_journey(
    command: &ResetJourney,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut session = load_journey(command.journey_id, repo).await?;

    session.reset(command.correlation_id, clock);

    persist(&mut session, command, repo, tracker).await
}

/// Handles the `EndJourney` command: records the end in the tracker and
/// drops the journey's stream. The caller unregisters the tracker.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if neither a stream nor a
/// tracker exists, or `DomainError` if the stream cannot be deleted.
pub async fn handle_end_journey(
    command: &EndJourney,
    repo: &dyn EventRepository,
    tracker: Option<&EngagementTracker>,
) -> Result<(), DomainError> {
    let removed = repo.delete_stream(command.journey_id).await?;
    if !removed && tracker.is_none() {
        return Err(DomainError::AggregateNotFound(command.journey_id));
    }

    if let Some(tracker) = tracker {
        tracker.end_session(command.reason.as_str());
    }

    info!(
        journey_id = %command.journey_id,
        correlation_id = %command.correlation_id,
        intent = command.command_type(),
        reason = command.reason.as_str(),
        "journey ended"
    );

    Ok(())
}
