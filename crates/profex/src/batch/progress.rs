//! Batch progress events for live observation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::record::{BatchStats, ProfileRecord, RecordStatus};

/// Progress event published after every record transition.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProgressEvent {
    /// Zero-based position of the record in the batch.
    pub index: usize,
    /// File the record belongs to.
    pub file_name: String,
    /// Status the record just moved to.
    pub status: RecordStatus,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Counters derived at the time of the event.
    pub stats: BatchStats,
    /// Timestamp of this event.
    pub timestamp: DateTime<Utc>,
}

impl BatchProgressEvent {
    /// Snapshots a record right after a transition.
    pub fn from_record(index: usize, record: &ProfileRecord, stats: BatchStats) -> Self {
        Self {
            index,
            file_name: record.file_name.clone(),
            status: record.status,
            error: record.error_message.clone(),
            stats,
            timestamp: Utc::now(),
        }
    }
}

/// Observer of batch progress.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: BatchProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: BatchProgressEvent) {}
}

/// Fans progress events out to any number of subscribers.
#[derive(Clone)]
pub struct ProgressBroadcaster {
    sender: Arc<broadcast::Sender<BatchProgressEvent>>,
}

impl ProgressBroadcaster {
    /// Creates a broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a new subscriber for progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<BatchProgressEvent> {
        self.sender.subscribe()
    }
}

impl ProgressReporter for ProgressBroadcaster {
    fn report(&self, event: BatchProgressEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
