//! Test sinks — `EngagementSink` doubles.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use donorpath_core::engagement::{EngagementRecord, EngagementSink, SinkError};

/// Keeps every delivered record.
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: Mutex<Vec<EngagementRecord>>,
}

impl RecordingSink {
    /// An empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records delivered so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn received(&self) -> Vec<EngagementRecord> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl EngagementSink for RecordingSink {
    async fn send(&self, record: &EngagementRecord) -> Result<(), SinkError> {
        self.received.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Rejects every record as unreachable.
#[derive(Debug)]
pub struct FailingSink;

#[async_trait]
impl EngagementSink for FailingSink {
    async fn send(&self, _record: &EngagementRecord) -> Result<(), SinkError> {
        Err(SinkError::Unreachable("connection refused".into()))
    }
}

/// Takes a long time to accept each record, standing in for a slow
/// analytics endpoint.
#[derive(Debug)]
pub struct StallingSink(pub Duration);

#[async_trait]
impl EngagementSink for StallingSink {
    async fn send(&self, _record: &EngagementRecord) -> Result<(), SinkError> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}
