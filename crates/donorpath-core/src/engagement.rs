//! Engagement record and analytics sink abstraction.
//!
//! Records flow from the engagement tracker into an external analytics sink.
//! Sinks are best-effort: their errors are reported to the tracker, which
//! swallows them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One tracked interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRecord {
    /// Event name, e.g. `story_choice_selected`.
    pub event: String,
    /// Journey stage label at the time of recording.
    pub stage: String,
    /// When the interaction happened.
    pub timestamp: DateTime<Utc>,
    /// The session the interaction belongs to.
    pub session_id: Uuid,
    /// Free-form event data; always a JSON object.
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Failure delivering a record to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink could not be reached.
    #[error("sink unreachable: {0}")]
    Unreachable(String),

    /// The sink answered with a rejection.
    #[error("sink rejected record with status {status}")]
    Rejected {
        /// Status code returned by the sink.
        status: u16,
    },
}

/// Destination for engagement records.
#[async_trait]
pub trait EngagementSink: Send + Sync {
    /// Delivers one record.
    async fn send(&self, record: &EngagementRecord) -> Result<(), SinkError>;
}
