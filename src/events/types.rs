//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};

/// All events emitted by the analysis core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Batch scheduler events
    Batch(BatchEvent),
    /// Content cache events
    Cache(CacheEvent),
}

/// Job lifecycle events from the batch scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BatchEvent {
    /// A job was added to the queue
    Queued { job_id: String, name: String },
    /// A worker picked the job up
    Started { job_id: String },
    /// The job finished with a result
    Completed {
        job_id: String,
        from_cache: bool,
        processing_time_ms: u64,
    },
    /// The job failed; siblings are unaffected
    Failed { job_id: String, error: String },
    /// A pending job was cancelled before it started
    Cancelled { job_id: String },
    /// No job is pending or processing
    Idle(BatchCounts),
}

/// Counts carried by [`BatchEvent::Idle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchCounts {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Events from the content cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheEvent {
    /// A lookup found a live entry
    Hit { key: String, access_count: u64 },
    /// A lookup found nothing usable
    Miss { key: String },
    /// An entry was dropped for exceeding its maximum age
    Expired { key: String },
    /// An entry could not be read back and was dropped
    Corrupt { key: String },
    /// A sweep finished
    Swept { removed: usize },
}
