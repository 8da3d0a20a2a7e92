//! DonorPath event store.
//!
//! Journeys live only as long as the process; their event streams are kept
//! in memory so every journey can be replayed from its first intent.

pub mod memory_event_repository;

pub use memory_event_repository::InMemoryEventRepository;
