//! Background delivery of engagement records to a sink.

use std::sync::Arc;

use donorpath_core::engagement::{EngagementRecord, EngagementSink};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default number of records that may wait for the sink before new ones are
/// dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Handle for offering records to the delivery worker. Cheap to clone; the
/// worker stops once every handle is dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct Delivery {
    sender: mpsc::Sender<EngagementRecord>,
}

impl Delivery {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(sink: Arc<dyn EngagementSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<EngagementRecord>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(record) = receiver.recv().await {
                match sink.send(&record).await {
                    Ok(()) => debug!(event = %record.event, "engagement record delivered"),
                    Err(err) => warn!(
                        event = %record.event,
                        session_id = %record.session_id,
                        error = %err,
                        "engagement sink failed; record dropped"
                    ),
                }
            }
        });
        (Self { sender }, worker)
    }

    /// Queues a record without waiting. Returns `false` if it was dropped.
    pub fn offer(&self, record: EngagementRecord) -> bool {
        match self.sender.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(record)) => {
                warn!(event = %record.event, "engagement queue full; record not forwarded");
                false
            }
            Err(TrySendError::Closed(record)) => {
                warn!(event = %record.event, "engagement worker stopped; record not forwarded");
                false
            }
        }
    }
}
