//! Job and status types for the batch scheduler.

use crate::core::provider::AnalysisResult;
use crate::error::VerdictError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::SystemTime;

/// Lifecycle of a job: `Pending -> Processing -> Completed | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// An uploaded image waiting to be queued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Source filename, used for display only
    pub name: String,
    /// Raw file content
    pub bytes: Vec<u8>,
    /// Modification time reported by the source, if known
    pub last_modified: Option<SystemTime>,
}

impl ImageInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, modified: SystemTime) -> Self {
        self.last_modified = Some(modified);
        self
    }

    /// Read an image file from disk
    pub fn from_path(path: &Path) -> Result<Self, VerdictError> {
        let io_error = |source| VerdictError::Io {
            path: path.display().to_string(),
            source,
        };
        let bytes = std::fs::read(path).map_err(io_error)?;
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            bytes,
            last_modified: modified,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// One queued analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    /// Opaque unique id
    pub id: String,
    /// Source filename
    pub name: String,
    pub status: JobStatus,
    /// Verdict, once completed
    pub result: Option<AnalysisResult>,
    /// Failure reason, once failed
    pub error: Option<String>,
    /// Wall-clock duration of the processing phase
    pub processing_time_ms: Option<u64>,
    /// Whether the verdict came from the content cache
    pub from_cache: bool,
    /// Cache key of the content, when a cache is attached
    pub content_key: Option<String>,
    /// When the job entered the queue
    pub queued_at: DateTime<Utc>,
}

impl BatchJob {
    pub(crate) fn pending(id: String, name: String) -> Self {
        Self {
            id,
            name,
            status: JobStatus::Pending,
            result: None,
            error: None,
            processing_time_ms: None,
            from_cache: false,
            content_key: None,
            queued_at: Utc::now(),
        }
    }
}

/// Point-in-time view of the queue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatus {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub in_progress: usize,
    pub pending: usize,
    /// Jobs in insertion order
    pub jobs: Vec<BatchJob>,
}

impl BatchStatus {
    /// Recount from the job list
    pub fn from_jobs(jobs: &[BatchJob]) -> Self {
        let mut status = BatchStatus {
            total: jobs.len(),
            jobs: jobs.to_vec(),
            ..BatchStatus::default()
        };

        for job in jobs {
            match job.status {
                JobStatus::Pending => status.pending += 1,
                JobStatus::Processing => status.in_progress += 1,
                JobStatus::Completed => status.completed += 1,
                JobStatus::Failed => status.failed += 1,
            }
        }

        status
    }

    /// Nothing pending or processing
    pub fn is_idle(&self) -> bool {
        self.pending == 0 && self.in_progress == 0
    }

    /// Fraction of jobs in a terminal state (1.0 for an empty queue)
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed + self.failed) as f64 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus) -> BatchJob {
        BatchJob {
            status,
            ..BatchJob::pending(uuid::Uuid::new_v4().to_string(), "x.png".into())
        }
    }

    #[test]
    fn counts_add_up_to_total() {
        let jobs = vec![
            job(JobStatus::Pending),
            job(JobStatus::Processing),
            job(JobStatus::Completed),
            job(JobStatus::Completed),
            job(JobStatus::Failed),
        ];

        let status = BatchStatus::from_jobs(&jobs);

        assert_eq!(status.total, 5);
        assert_eq!(
            status.total,
            status.completed + status.failed + status.in_progress + status.pending
        );
        assert_eq!(status.completed, 2);
        assert!((status.progress() - 0.6).abs() < 1e-12);
        assert!(!status.is_idle());
    }

    #[test]
    fn empty_queue_is_idle() {
        let status = BatchStatus::from_jobs(&[]);
        assert!(status.is_idle());
        assert_eq!(status.progress(), 1.0);
    }

    #[test]
    fn terminal_states() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&JobStatus::Processing).unwrap(), "\"processing\"");
    }
}
