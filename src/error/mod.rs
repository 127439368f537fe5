//! # Error Module
//!
//! Error types for the analysis core.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - keys, job ids, what went wrong
//! - **Failures stay local** - a failed job is recorded on the job, not raised
//! - **The cache is optional** - cache trouble degrades to a miss wherever possible

use thiserror::Error;

/// Top-level library error
#[derive(Error, Debug)]
pub enum VerdictError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Similarity error: {0}")]
    Similarity(#[from] SimilarityError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning bytes into a pixel grid
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Unsupported or unrecognised image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {reason}")]
    Corrupt { reason: String },

    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Resampling failed: {0}")]
    ResizeFailed(String),
}

/// Errors raised by the similarity engine
#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("Could not decode {side} image: {source}")]
    Decode {
        side: ImageSide,
        #[source]
        source: DecodeError,
    },

    #[error("Could not decode input #{index}: {source}")]
    DecodeAt {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("Image buffers have mismatched sizes ({left} vs {right} bytes)")]
    SizeMismatch { left: usize, right: usize },
}

/// Which input of a comparison failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSide {
    First,
    Second,
}

impl std::fmt::Display for ImageSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSide::First => write!(f, "first"),
            ImageSide::Second => write!(f, "second"),
        }
    }
}

/// Errors from the content cache and its backing store
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache database at {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Store query failed: {0}")]
    QueryFailed(String),

    #[error("Store is unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize cache entry for {key}: {reason}")]
    SerializationFailed { key: String, reason: String },
}

/// Errors surfaced by a detection provider
///
/// The core never retries; the variant tells the layer above whether a
/// retry makes sense.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{0} (retryable)")]
    Retryable(String),

    #[error("{0}")]
    Fatal(String),
}

impl ProviderError {
    /// Whether the caller may reasonably try again
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Retryable(_))
    }
}

/// Errors from the batch scheduler API itself (never from individual jobs)
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Concurrency budget must be at least 1 (got {0})")]
    InvalidConcurrency(usize),

    #[error("Failed to spawn worker thread: {0}")]
    SpawnFailed(String),

    #[error("No detection provider configured")]
    MissingProvider,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, VerdictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similarity_error_names_the_side() {
        let error = SimilarityError::Decode {
            side: ImageSide::Second,
            source: DecodeError::UnsupportedFormat,
        };
        let message = error.to_string();
        assert!(message.contains("second"));
        assert!(message.contains("Unsupported"));
    }

    #[test]
    fn retryable_provider_error_is_flagged() {
        assert!(ProviderError::Retryable("rate limited".into()).is_retryable());
        assert!(!ProviderError::Fatal("bad request".into()).is_retryable());
    }

    #[test]
    fn serialization_error_includes_key() {
        let error = CacheError::SerializationFailed {
            key: "analysis:abc".into(),
            reason: "eof".into(),
        };
        assert!(error.to_string().contains("analysis:abc"));
    }
}
