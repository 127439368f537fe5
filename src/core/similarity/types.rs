//! Result types for image comparisons.

use serde::{Deserialize, Serialize};

/// Classification bands over the composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityClass {
    /// Similarity above 0.95
    Identical,
    /// Similarity above 0.8
    Similar,
    /// Similarity above 0.5
    Different,
    /// Everything else
    VeryDifferent,
}

impl SimilarityClass {
    /// Classify a composite similarity score
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity > super::IDENTICAL_THRESHOLD {
            SimilarityClass::Identical
        } else if similarity > super::SIMILAR_THRESHOLD {
            SimilarityClass::Similar
        } else if similarity > super::DIFFERENT_THRESHOLD {
            SimilarityClass::Different
        } else {
            SimilarityClass::VeryDifferent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityClass::Identical => "identical",
            SimilarityClass::Similar => "similar",
            SimilarityClass::Different => "different",
            SimilarityClass::VeryDifferent => "very_different",
        }
    }
}

impl std::fmt::Display for SimilarityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized difference components, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferenceBreakdown {
    /// Per-pixel colour distance
    pub structural: f64,
    /// Luminance distribution distance
    pub color: f64,
    /// Edge map distance
    pub texture: f64,
}

/// Raw metrics before normalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Mean Euclidean RGB distance (0 to ~441)
    pub pixel_difference: f64,
    /// Luma histogram L1 distance over pixel count (0 to 2)
    pub histogram_difference: f64,
    /// Mean absolute Sobel magnitude difference
    pub edge_detection_difference: f64,
}

/// Outcome of one comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Composite score in [0, 1]
    pub similarity: f64,
    pub differences: DifferenceBreakdown,
    pub analysis: RawMetrics,
    pub classification: SimilarityClass,
}

impl SimilarityResult {
    /// Similarity as a percentage (0-100)
    pub fn similarity_percent(&self) -> f64 {
        self.similarity * 100.0
    }
}

/// Two inputs from a deduplication pass that scored above the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarPair {
    /// Index of the first input
    pub first: usize,
    /// Index of the second input (always greater than `first`)
    pub second: usize,
    pub result: SimilarityResult,
}
