//! # Provider Module
//!
//! The seam to the remote authenticity detector.
//!
//! The core only knows the contract: bytes in, a verdict or an error out.
//! Transport, authentication and retries live with the implementor.

use crate::error::ProviderError;
use serde::{Deserialize, Serialize};

/// Verdict returned by a detection provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Confidence in the verdict, in [0, 1]
    pub confidence: f64,
    /// Whether the detector flagged the image (e.g. as AI-generated)
    pub is_positive: bool,
    /// Name of the model that produced the verdict
    pub model_label: String,
    /// Free-form supporting notes
    #[serde(default)]
    pub details: Vec<String>,
}

impl AnalysisResult {
    pub fn new(confidence: f64, is_positive: bool, model_label: impl Into<String>) -> Self {
        Self {
            confidence: confidence.clamp(0.0, 1.0),
            is_positive,
            model_label: model_label.into(),
            details: Vec::new(),
        }
    }

    /// Attach a supporting note
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    /// Confidence as a percentage (0-100)
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// A remote (or local) authenticity detector.
///
/// Called from scheduler worker threads; implementations block until the
/// verdict arrives and must be safe to call concurrently.
pub trait DetectionProvider: Send + Sync {
    /// Analyze one image.
    fn analyze(&self, bytes: &[u8]) -> Result<AnalysisResult, ProviderError>;

    /// Short name for logs
    fn name(&self) -> &str {
        "provider"
    }
}

/// Adapts a closure into a provider
pub struct FnProvider<F> {
    name: String,
    analyze: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&[u8]) -> Result<AnalysisResult, ProviderError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, analyze: F) -> Self {
        Self {
            name: name.into(),
            analyze,
        }
    }
}

impl<F> DetectionProvider for FnProvider<F>
where
    F: Fn(&[u8]) -> Result<AnalysisResult, ProviderError> + Send + Sync,
{
    fn analyze(&self, bytes: &[u8]) -> Result<AnalysisResult, ProviderError> {
        (self.analyze)(bytes)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
