//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots whose state is derived solely from their own
/// event stream.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events produced by the last command that have not been
    /// persisted yet.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);

    /// Applies a recorded history in order.
    fn replay<'a, I>(&mut self, history: I)
    where
        I: IntoIterator<Item = &'a Self::Event>,
        Self::Event: 'a,
        Self: Sized,
    {
        for event in history {
            self.apply(event);
        }
    }
}
