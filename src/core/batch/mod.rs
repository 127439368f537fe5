//! # Batch Module
//!
//! Queue of uploaded images analyzed by a detection provider with bounded
//! concurrency.
//!
//! ## Lifecycle
//! `Pending -> Processing -> Completed | Failed`
//!
//! - Jobs start in insertion order
//! - At most `max_concurrent` jobs are `Processing` at any instant
//! - A failure affects only its own job
//! - With a [`ContentCache`](crate::core::cache::ContentCache) attached,
//!   byte-identical inputs are answered without calling the provider

mod scheduler;
mod types;

pub use scheduler::{BatchScheduler, BatchSchedulerBuilder, SchedulerConfig, CANCELLED_MESSAGE};
pub use types::{BatchJob, BatchStatus, ImageInput, JobStatus};
