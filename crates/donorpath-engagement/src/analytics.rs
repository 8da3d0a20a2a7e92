//! Read models derived from a session's engagement log.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use donorpath_core::engagement::EngagementRecord;
use serde::Serialize;
use uuid::Uuid;

/// Everything recorded for one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyAnalytics {
    /// The tracked session.
    pub session_id: Uuid,
    /// When tracking started.
    pub start_time: DateTime<Utc>,
    /// Stage label at the time of the snapshot.
    pub current_stage: String,
    /// All records, oldest first.
    pub events: Vec<EngagementRecord>,
}

/// Event counts per stage and whether the visitor converted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionFunnel {
    /// Number of records made in each stage.
    pub events_per_stage: BTreeMap<String, usize>,
    /// Milliseconds since tracking started.
    pub total_time_ms: u64,
    /// Whether a donation intent was recorded.
    pub converted: bool,
}

impl ConversionFunnel {
    pub(crate) fn from_records(records: &[EngagementRecord], total_time_ms: u64) -> Self {
        let mut events_per_stage = BTreeMap::new();
        for record in records {
            *events_per_stage.entry(record.stage.clone()).or_insert(0) += 1;
        }
        let converted = records
            .iter()
            .any(|r| r.event == crate::tracker::DONATION_INTENT_EVENT);
        Self {
            events_per_stage,
            total_time_ms,
            converted,
        }
    }
}
