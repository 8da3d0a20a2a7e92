//! Test repositories — mock `EventRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use donorpath_core::error::DomainError;
use donorpath_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// An event repository that serves a fixed history from `load_events` and
/// records every `append_events` and `delete_stream` call without applying
/// it.
#[derive(Debug, Default)]
pub struct RecordingEventRepository {
    history: Vec<StoredEvent>,
    appended: Mutex<Vec<(Uuid, i64, Vec<StoredEvent>)>>,
    deleted: Mutex<Vec<Uuid>>,
}

impl RecordingEventRepository {
    /// A repository whose streams are all empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository that returns `history` for every stream.
    #[must_use]
    pub fn with_history(history: Vec<StoredEvent>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    /// Returns a snapshot of all append calls as
    /// `(aggregate_id, expected_version, events)`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }

    /// Returns every stream id passed to `delete_stream`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted_streams(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.history.clone())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((aggregate_id, expected_version, events.to_vec()));
        Ok(())
    }

    async fn delete_stream(&self, aggregate_id: Uuid) -> Result<bool, DomainError> {
        self.deleted.lock().unwrap().push(aggregate_id);
        Ok(!self.history.is_empty())
    }
}

/// An event repository that always returns an empty event list and silently
/// accepts appends. Useful for "journey not found" scenarios and creation
/// commands.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }

    async fn delete_stream(&self, _aggregate_id: Uuid) -> Result<bool, DomainError> {
        Ok(false)
    }
}

/// An event repository that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("event store unavailable".into()))
    }

    async fn append_events(
        &self,
        _aggregate_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("event store unavailable".into()))
    }

    async fn delete_stream(&self, _aggregate_id: Uuid) -> Result<bool, DomainError> {
        Err(DomainError::Infrastructure("event store unavailable".into()))
    }
}
