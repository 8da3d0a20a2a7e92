//! Concrete analytics sinks.

use std::time::Duration;

use async_trait::async_trait;
use donorpath_core::engagement::{EngagementRecord, EngagementSink, SinkError};
use tracing::info;

/// Writes each record to the log and nowhere else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl EngagementSink for LogSink {
    async fn send(&self, record: &EngagementRecord) -> Result<(), SinkError> {
        info!(
            event = %record.event,
            stage = %record.stage,
            session_id = %record.session_id,
            data = %serde_json::Value::Object(record.data.clone()),
            "engagement event"
        );
        Ok(())
    }
}

/// POSTs each record as JSON to an analytics endpoint.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSink {
    /// Request timeout for a single delivery.
    pub const TIMEOUT: Duration = Duration::from_secs(5);

    /// Builds a sink for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns the client builder error if TLS initialization fails.
    pub fn new(endpoint: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(Self::TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }

    /// The configured endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EngagementSink for HttpSink {
    async fn send(&self, record: &EngagementRecord) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| SinkError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
