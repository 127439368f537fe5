//! Fast in-memory image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG payloads (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::DecodeError;
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Rgb, Rgba};
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Detect the raster format from the leading magic bytes.
///
/// Upload names lie often enough that the extension is never consulted.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat)
}

/// Decoder that picks the fastest path per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an in-memory image.
    ///
    /// - JPEG: zune-jpeg, falling back to the image crate on failure
    /// - Everything else: image crate
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        match sniff_format(bytes)? {
            ImageFormat::Jpeg => {
                Self::decode_jpeg(bytes).or_else(|_| Self::decode_fallback(bytes, ImageFormat::Jpeg))
            }
            format => Self::decode_fallback(bytes, format),
        }
    }

    fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder.decode().map_err(|e| DecodeError::Corrupt {
            reason: format!("zune-jpeg decode failed: {:?}", e),
        })?;

        let info = decoder.info().ok_or_else(|| DecodeError::Corrupt {
            reason: "JPEG header carried no image info".to_string(),
        })?;

        let width = info.width as u32;
        let height = info.height as u32;

        let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

        let image = match out_colorspace {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        DecodeError::Corrupt {
                            reason: "RGB buffer size mismatch".to_string(),
                        }
                    })?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        DecodeError::Corrupt {
                            reason: "RGBA buffer size mismatch".to_string(),
                        }
                    })?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels).ok_or_else(|| {
                        DecodeError::Corrupt {
                            reason: "Luma buffer size mismatch".to_string(),
                        }
                    })?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => return Self::decode_fallback(bytes, ImageFormat::Jpeg),
        };

        Ok(image)
    }

    fn decode_fallback(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, DecodeError> {
        image::load_from_memory_with_format(bytes, format).map_err(|e| DecodeError::Corrupt {
            reason: e.to_string(),
        })
    }
}
