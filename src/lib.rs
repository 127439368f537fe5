//! # Verdict
//!
//! Image comparison and batch analysis for upload-review workflows.
//!
//! ## What It Does
//! - **Compare** - Score two images by structure, color and texture
//! - **Analyze** - Run batches through a detection provider, a few at a time
//! - **Remember** - Reuse verdicts for byte-identical content
//!
//! ## Architecture
//! - `core` - Decoder, similarity engine, provider seam, cache and scheduler
//! - `events` - Progress events for front ends
//! - `error` - Error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, VerdictError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. Filtering follows
/// `RUST_LOG`. Calling it twice leaves the first subscriber in place.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
