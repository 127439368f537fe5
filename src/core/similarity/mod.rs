//! # Similarity Module
//!
//! Deterministic image comparison for deduplication and side-by-side checks.
//!
//! ## How It Works
//! 1. Decode both inputs and resample to 256x256 RGBA
//! 2. Measure per-pixel RGB distance, luma histogram distance and Sobel
//!    edge-map distance
//! 3. Normalize each into a [0, 1] difference component
//! 4. Weight them into one composite score and classify it
//!
//! | Similarity | Classification |
//! |------------|----------------|
//! | > 0.95     | identical      |
//! | > 0.8      | similar        |
//! | > 0.5      | different      |
//! | otherwise  | very_different |
//!
//! Undecodable input is always an error, never a low score.

pub mod metrics;
mod types;

pub use types::{DifferenceBreakdown, RawMetrics, SimilarPair, SimilarityClass, SimilarityResult};

use crate::core::decoder::{DecodedImage, ImageSource, PixelDecoder, RasterDecoder};
use crate::error::{ImageSide, SimilarityError};
use rayon::prelude::*;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Side length every input is resampled to before comparison
pub const COMPARISON_SIZE: u32 = 256;

/// Pixel distance that counts as a full structural difference
pub const STRUCTURAL_SCALE: f64 = 255.0;

/// Histogram distance that counts as a full colour difference.
///
/// The histogram distance is a fraction of displaced pixels (0 to 2), so
/// 1.0 means "every pixel moved to another luma bucket". Flat images one
/// level apart therefore get a full colour difference and score about 0.70.
pub const COLOR_SCALE: f64 = 1.0;

/// Edge distance that counts as a full texture difference
pub const TEXTURE_SCALE: f64 = 100.0;

pub const STRUCTURAL_WEIGHT: f64 = 0.4;
pub const COLOR_WEIGHT: f64 = 0.3;
pub const TEXTURE_WEIGHT: f64 = 0.3;

pub const IDENTICAL_THRESHOLD: f64 = 0.95;
pub const SIMILAR_THRESHOLD: f64 = 0.8;
pub const DIFFERENT_THRESHOLD: f64 = 0.5;

/// Turn raw metrics into a scored, classified result.
pub fn score(analysis: RawMetrics) -> SimilarityResult {
    let differences = DifferenceBreakdown {
        structural: (analysis.pixel_difference / STRUCTURAL_SCALE).clamp(0.0, 1.0),
        color: (analysis.histogram_difference / COLOR_SCALE).clamp(0.0, 1.0),
        texture: (analysis.edge_detection_difference / TEXTURE_SCALE).clamp(0.0, 1.0),
    };

    let similarity = STRUCTURAL_WEIGHT * (1.0 - differences.structural)
        + COLOR_WEIGHT * (1.0 - differences.color)
        + TEXTURE_WEIGHT * (1.0 - differences.texture);

    SimilarityResult {
        similarity,
        differences,
        analysis,
        classification: SimilarityClass::from_similarity(similarity),
    }
}

/// Compare two images that already share dimensions.
pub fn compare_decoded(
    a: &DecodedImage,
    b: &DecodedImage,
) -> Result<SimilarityResult, SimilarityError> {
    if a.pixels().len() != b.pixels().len() || a.width() != b.width() {
        return Err(SimilarityError::SizeMismatch {
            left: a.pixels().len(),
            right: b.pixels().len(),
        });
    }

    let luma_a = metrics::luminance_map(a);
    let luma_b = metrics::luminance_map(b);

    let analysis = RawMetrics {
        pixel_difference: metrics::pixel_difference(a, b),
        histogram_difference: metrics::histogram_difference(&luma_a, &luma_b),
        edge_detection_difference: metrics::edge_difference(
            &luma_a,
            &luma_b,
            a.width(),
            a.height(),
        ),
    };

    Ok(score(analysis))
}

/// Compares images through a shared decoder
#[derive(Clone)]
pub struct SimilarityEngine {
    decoder: Arc<dyn PixelDecoder>,
    size: u32,
}

impl SimilarityEngine {
    /// Engine using the default raster decoder
    pub fn new() -> Self {
        Self::with_decoder(Arc::new(RasterDecoder::new()))
    }

    /// Engine sharing a decoder with other components
    pub fn with_decoder(decoder: Arc<dyn PixelDecoder>) -> Self {
        Self {
            decoder,
            size: COMPARISON_SIZE,
        }
    }

    /// Compare two images.
    ///
    /// Both inputs are decoded in parallel. A decode failure on either side
    /// aborts the comparison.
    pub fn compare<'a, 'b>(
        &self,
        a: impl Into<ImageSource<'a>>,
        b: impl Into<ImageSource<'b>>,
    ) -> Result<SimilarityResult, SimilarityError> {
        let (a, b) = (a.into(), b.into());
        let (left, right) = rayon::join(|| self.normalize(a), || self.normalize(b));

        let left = left.map_err(|source| SimilarityError::Decode {
            side: ImageSide::First,
            source,
        })?;
        let right = right.map_err(|source| SimilarityError::Decode {
            side: ImageSide::Second,
            source,
        })?;

        let result = compare_decoded(&left, &right)?;
        debug!(
            similarity = result.similarity,
            classification = %result.classification,
            "compared images"
        );
        Ok(result)
    }

    /// Compare one reference image against many candidates in parallel.
    ///
    /// The reference must decode; each candidate gets its own result.
    pub fn compare_against(
        &self,
        reference: ImageSource<'_>,
        candidates: &[ImageSource<'_>],
    ) -> Result<Vec<Result<SimilarityResult, SimilarityError>>, SimilarityError> {
        let reference = self
            .normalize(reference)
            .map_err(|source| SimilarityError::Decode {
                side: ImageSide::First,
                source,
            })?;

        Ok(candidates
            .par_iter()
            .map(|candidate| {
                let candidate =
                    self.normalize(*candidate)
                        .map_err(|source| SimilarityError::Decode {
                            side: ImageSide::Second,
                            source,
                        })?;
                compare_decoded(&reference, &candidate)
            })
            .collect())
    }

    /// Every pair of inputs whose similarity is at least `min_similarity`.
    ///
    /// Fails on the first input that cannot be decoded. Pairs come back
    /// ordered by `(first, second)`.
    pub fn find_near_duplicates(
        &self,
        images: &[ImageSource<'_>],
        min_similarity: f64,
    ) -> Result<Vec<SimilarPair>, SimilarityError> {
        let decoded: Vec<Cow<'_, DecodedImage>> = images
            .par_iter()
            .enumerate()
            .map(|(index, image)| {
                self.normalize(*image)
                    .map_err(|source| SimilarityError::DecodeAt { index, source })
            })
            .collect::<Result<_, _>>()?;

        let pairs: Vec<(usize, usize)> = (0..decoded.len())
            .flat_map(|i| (i + 1..decoded.len()).map(move |j| (i, j)))
            .collect();

        let mut matches: Vec<SimilarPair> = pairs
            .par_iter()
            .filter_map(|&(first, second)| {
                compare_decoded(&decoded[first], &decoded[second])
                    .ok()
                    .filter(|result| result.similarity >= min_similarity)
                    .map(|result| SimilarPair {
                        first,
                        second,
                        result,
                    })
            })
            .collect();

        matches.sort_by_key(|pair| (pair.first, pair.second));
        Ok(matches)
    }

    fn normalize<'a>(
        &self,
        source: ImageSource<'a>,
    ) -> Result<Cow<'a, DecodedImage>, crate::error::DecodeError> {
        source.normalize(self.decoder.as_ref(), self.size)
    }
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("size", &self.size)
            .finish()
    }
}
