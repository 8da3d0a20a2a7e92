//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Every variant leaves the aggregate untouched: a command either produces
/// its full set of events or fails with one of these.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A story, scene, hotspot, choice, or journey lookup missed.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was being looked up.
        kind: &'static str,
        /// The identifier that did not resolve.
        id: String,
    },

    /// A choice points at a scene that does not exist in its story.
    #[error(
        "broken content graph in story {story_id}: scene {scene_id} links to missing scene {next_scene_id}"
    )]
    BrokenContentGraph {
        /// The story containing the dangling edge.
        story_id: String,
        /// The scene whose choice is dangling.
        scene_id: String,
        /// The target scene id that does not resolve.
        next_scene_id: String,
    },

    /// A donation amount that is not a positive, finite number.
    #[error("invalid donation amount: {0}")]
    InvalidAmount(f64),

    /// An intent was issued in a stage that does not accept it.
    #[error("cannot {intent} while in stage {stage}")]
    InvalidTransition {
        /// The stage the journey was in.
        stage: String,
        /// The rejected intent.
        intent: &'static str,
    },

    /// An intent was issued against a scene the journey has already left.
    #[error("stale intent: issued for scene {issued_for}, current scene is {current}")]
    StaleIntent {
        /// The scene the intent was issued against.
        issued_for: String,
        /// The scene the journey is actually on.
        current: String,
    },

    /// An aggregate stream was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error(
        "concurrency conflict on aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        /// The aggregate that had the conflict.
        aggregate_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Shorthand for a [`DomainError::NotFound`].
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Returns `true` for lookup misses the caller can recover from by
    /// re-rendering the current state.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::InvalidTransition { .. }
                | Self::StaleIntent { .. }
                | Self::InvalidAmount(_)
                | Self::Validation(_)
        )
    }
}
