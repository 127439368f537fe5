//! # Core Module
//!
//! The engine behind the CLI.
//!
//! ## Modules
//! - `decoder` - Turns encoded bytes into fixed-size RGBA rasters
//! - `similarity` - Scores how alike two images are
//! - `provider` - Seam to an external detection service
//! - `cache` - Content-addressed store of previous verdicts
//! - `batch` - Bounded-concurrency queue feeding the provider

pub mod batch;
pub mod cache;
pub mod decoder;
pub mod provider;
pub mod similarity;

// Re-export commonly used types
pub use batch::{BatchJob, BatchScheduler, BatchStatus, ImageInput, JobStatus};
pub use cache::{CacheStats, ContentCache, ContentKey};
pub use decoder::{DecodedImage, ImageSource};
pub use provider::{AnalysisResult, DetectionProvider};
pub use similarity::{SimilarityClass, SimilarityEngine, SimilarityResult};
