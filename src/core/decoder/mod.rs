//! # Decoder Module
//!
//! Turns arbitrary uploaded bytes into fixed-size RGBA pixel grids.
//!
//! ## Pieces
//! - [`DecodedImage`] - immutable row-major RGBA buffer
//! - [`PixelDecoder`] - the decoding seam; swap it out in tests or embedders
//! - [`RasterDecoder`] - default implementation (zune-jpeg + image crate,
//!   resampled with fast_image_resize)
//! - [`ImageSource`] - raw bytes or an already decoded image

pub mod fast_decode;
pub mod fast_resize;

use crate::error::DecodeError;
use std::borrow::Cow;

pub use fast_decode::{sniff_format, FastDecoder};
pub use fast_resize::{resize_to_rgba, FastResizer};

/// Bytes per RGBA pixel
pub const CHANNELS: usize = 4;

/// A decoded image: width, height and row-major RGBA bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Wrap an RGBA buffer, checking that it matches the dimensions.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(DecodeError::Corrupt {
                reason: format!(
                    "expected {} bytes for {}x{} RGBA, got {}",
                    expected,
                    width,
                    height,
                    pixels.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image pixel by pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut pixel: F) -> Result<Self, DecodeError>
    where
        F: FnMut(u32, u32) -> [u8; 4],
    {
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidDimensions { width, height });
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&pixel(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-colour image
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, DecodeError> {
        Self::from_fn(width, height, |_, _| rgba)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// RGBA value at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        ]
    }

    /// Iterate over RGBA pixels in row-major order
    pub fn rgba(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(CHANNELS)
    }
}

/// Decodes raw bytes into a pixel grid of a requested size.
pub trait PixelDecoder: Send + Sync {
    /// Decode `bytes` and resample to exactly `width` x `height`.
    ///
    /// Fails if the bytes are not a supported raster format.
    fn decode(&self, bytes: &[u8], width: u32, height: u32) -> Result<DecodedImage, DecodeError>;
}

/// Default decoder backed by zune-jpeg, the image crate and fast_image_resize
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl RasterDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl PixelDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8], width: u32, height: u32) -> Result<DecodedImage, DecodeError> {
        let image = FastDecoder::decode(bytes)?;
        resize_to_rgba(&image, width, height)
    }
}

/// Input to a comparison: either raw bytes or an image decoded earlier.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    Bytes(&'a [u8]),
    Decoded(&'a DecodedImage),
}

impl<'a> ImageSource<'a> {
    /// Produce a `size` x `size` grid, decoding or resampling only when needed.
    pub fn normalize(
        self,
        decoder: &dyn PixelDecoder,
        size: u32,
    ) -> Result<Cow<'a, DecodedImage>, DecodeError> {
        match self {
            ImageSource::Bytes(bytes) => decoder.decode(bytes, size, size).map(Cow::Owned),
            ImageSource::Decoded(image) if image.width() == size && image.height() == size => {
                Ok(Cow::Borrowed(image))
            }
            ImageSource::Decoded(image) => FastResizer::new()
                .resample(image, size, size)
                .map(Cow::Owned),
        }
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for ImageSource<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        ImageSource::Bytes(bytes.as_slice())
    }
}

impl<'a> From<&'a DecodedImage> for ImageSource<'a> {
    fn from(image: &'a DecodedImage) -> Self {
        ImageSource::Decoded(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn from_rgba_checks_length() {
        assert!(DecodedImage::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(DecodedImage::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(DecodedImage::from_rgba(0, 2, vec![]).is_err());
    }

    #[test]
    fn generated_images_need_area() {
        assert!(matches!(
            DecodedImage::from_fn(0, 4, |_, _| [0, 0, 0, 255]),
            Err(DecodeError::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(DecodedImage::solid(4, 0, [0, 0, 0, 255]).is_err());
    }

    #[test]
    fn pixel_reads_row_major() {
        let image = DecodedImage::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]).unwrap();
        assert_eq!(image.pixel(2, 1), [2, 1, 0, 255]);
        assert_eq!(image.rgba().count(), 6);
    }

    #[test]
    fn raster_decoder_resamples_to_target() {
        let decoded = RasterDecoder::new().decode(&png_bytes(40, 20), 64, 64).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn decoded_source_at_target_size_is_borrowed() {
        let image = DecodedImage::solid(8, 8, [1, 2, 3, 255]).unwrap();
        let normalized = ImageSource::from(&image)
            .normalize(&RasterDecoder, 8)
            .unwrap();
        assert!(matches!(normalized, Cow::Borrowed(_)));
    }

    #[test]
    fn decoded_source_is_resampled() {
        let image = DecodedImage::solid(10, 4, [1, 2, 3, 255]).unwrap();
        let normalized = ImageSource::from(&image)
            .normalize(&RasterDecoder, 8)
            .unwrap();
        assert_eq!(normalized.width(), 8);
        assert_eq!(normalized.height(), 8);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let bytes = b"definitely not pixels".to_vec();
        assert!(ImageSource::from(&bytes).normalize(&RasterDecoder, 8).is_err());
    }
}
