//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use donorpath_core::error::DomainError;
use donorpath_core::repository::{EventRepository, StoredEvent};

/// Event streams keyed by aggregate id, guarded for concurrent requests.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams currently held.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn stream_count(&self) -> Result<usize, DomainError> {
        Ok(self.read_streams()?.len())
    }

    fn read_streams(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<Uuid, Vec<StoredEvent>>>, DomainError>
    {
        self.streams
            .read()
            .map_err(|_| DomainError::Infrastructure("event store lock poisoned".to_owned()))
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.read_streams()?;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    #[allow(clippy::cast_possible_wrap)]
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| DomainError::Infrastructure("event store lock poisoned".to_owned()))?;
        let stream = streams.entry(aggregate_id).or_default();

        let actual = stream.len() as i64;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }

        for (offset, event) in events.iter().enumerate() {
            let expected_sequence = actual + offset as i64 + 1;
            if event.aggregate_id != aggregate_id || event.sequence_number != expected_sequence {
                return Err(DomainError::Infrastructure(format!(
                    "event {} out of order for stream {aggregate_id}: sequence {} (expected {expected_sequence})",
                    event.event_id, event.sequence_number
                )));
            }
        }

        stream.extend_from_slice(events);
        debug!(%aggregate_id, appended = events.len(), version = stream.len(), "events appended");
        Ok(())
    }

    async fn delete_stream(&self, aggregate_id: Uuid) -> Result<bool, DomainError> {
        let removed = self
            .streams
            .write()
            .map_err(|_| DomainError::Infrastructure("event store lock poisoned".to_owned()))?
            .remove(&aggregate_id);
        if let Some(stream) = &removed {
            debug!(%aggregate_id, events = stream.len(), "stream deleted");
        }
        Ok(removed.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donorpath_test_support::fixed_now;

    fn event(aggregate_id: Uuid, sequence_number: i64) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            aggregate_id,
            event_type: "journey.test".to_owned(),
            payload: serde_json::json!({}),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: fixed_now(),
        }
    }

    #[tokio::test]
    async fn test_append_then_load_returns_events_in_order() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let id = Uuid::new_v4();
        let first = vec![event(id, 1), event(id, 2)];
        let second = vec![event(id, 3)];

        // Act
        repo.append_events(id, 0, &first).await.unwrap();
        repo.append_events(id, 2, &second).await.unwrap();
        let loaded = repo.load_events(id).await.unwrap();

        // Assert
        let sequence: Vec<i64> = loaded.iter().map(|e| e.sequence_number).collect();
        assert_eq!(sequence, vec![1, 2, 3]);
        assert_eq!(repo.stream_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_load_unknown_stream_is_empty() {
        let repo = InMemoryEventRepository::new();

        let loaded = repo.load_events(Uuid::new_v4()).await.unwrap();

        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_stale_expected_version_is_conflict() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let id = Uuid::new_v4();
        repo.append_events(id, 0, &[event(id, 1)]).await.unwrap();

        // Act
        let result = repo.append_events(id, 0, &[event(id, 1)]).await;

        // Assert
        match result {
            Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual,
            }) => {
                assert_eq!(aggregate_id, id);
                assert_eq!(expected, 0);
                assert_eq!(actual, 1);
            }
            other => panic!("expected ConcurrencyConflict, got {other:?}"),
        }
        assert_eq!(repo.load_events(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_stream_frees_only_that_stream() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let ended = Uuid::new_v4();
        let live = Uuid::new_v4();
        repo.append_events(ended, 0, &[event(ended, 1)]).await.unwrap();
        repo.append_events(live, 0, &[event(live, 1)]).await.unwrap();

        // Act
        let first = repo.delete_stream(ended).await.unwrap();
        let second = repo.delete_stream(ended).await.unwrap();

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(repo.stream_count().unwrap(), 1);
        assert!(repo.load_events(ended).await.unwrap().is_empty());
        assert_eq!(repo.load_events(live).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_gap_in_sequence_is_rejected_without_partial_append() {
        let repo = InMemoryEventRepository::new();
        let id = Uuid::new_v4();

        let result = repo
            .append_events(id, 0, &[event(id, 1), event(id, 3)])
            .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(repo.load_events(id).await.unwrap().is_empty());
    }
}
