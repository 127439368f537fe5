//! Raw comparison metrics over two equally sized RGBA grids.
//!
//! All functions assume both images share dimensions; the engine guarantees
//! this by normalizing to a fixed square first.

use crate::core::decoder::DecodedImage;

/// Sobel kernel for horizontal gradients
const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Sobel kernel for vertical gradients
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// ITU-R BT.601 luma, rounded to the nearest integer.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    y.round().min(255.0) as u8
}

/// Per-pixel luma of an image, row-major
pub fn luminance_map(image: &DecodedImage) -> Vec<u8> {
    image.rgba().map(|p| luminance(p[0], p[1], p[2])).collect()
}

/// Mean Euclidean RGB distance per pixel (0 to ~441.67).
///
/// Alpha is ignored.
pub fn pixel_difference(a: &DecodedImage, b: &DecodedImage) -> f64 {
    let count = a.pixel_count();
    if count == 0 {
        return 0.0;
    }

    let total: f64 = a
        .rgba()
        .zip(b.rgba())
        .map(|(pa, pb)| {
            let dr = pa[0] as f64 - pb[0] as f64;
            let dg = pa[1] as f64 - pb[1] as f64;
            let db = pa[2] as f64 - pb[2] as f64;
            (dr * dr + dg * dg + db * db).sqrt()
        })
        .sum();

    total / count as f64
}

/// 256-bucket histogram of luma values
pub fn luminance_histogram(luma: &[u8]) -> [u32; 256] {
    let mut histogram = [0u32; 256];
    for &value in luma {
        histogram[value as usize] += 1;
    }
    histogram
}

/// Sum of absolute bucket differences divided by pixel count (0 to 2).
pub fn histogram_difference(a_luma: &[u8], b_luma: &[u8]) -> f64 {
    if a_luma.is_empty() {
        return 0.0;
    }

    let ha = luminance_histogram(a_luma);
    let hb = luminance_histogram(b_luma);

    let total: u64 = ha
        .iter()
        .zip(hb.iter())
        .map(|(&x, &y)| (x as i64 - y as i64).unsigned_abs())
        .sum();

    total as f64 / a_luma.len() as f64
}

/// Sobel gradient magnitude for every interior pixel.
///
/// The one-pixel border is skipped, so the map is `(w-2) x (h-2)`. A map
/// whose length does not match the dimensions yields no magnitudes.
pub(crate) fn edge_magnitudes(luma: &[u8], width: u32, height: u32) -> Vec<f64> {
    let (w, h) = (width as usize, height as usize);
    if w < 3 || h < 3 || luma.len() != w * h {
        return Vec::new();
    }

    let mut magnitudes = Vec::with_capacity((w - 2) * (h - 2));
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut gx = 0i32;
            let mut gy = 0i32;
            for ky in 0..3 {
                for kx in 0..3 {
                    let value = luma[(y + ky - 1) * w + (x + kx - 1)] as i32;
                    gx += SOBEL_X[ky][kx] * value;
                    gy += SOBEL_Y[ky][kx] * value;
                }
            }
            magnitudes.push(((gx * gx + gy * gy) as f64).sqrt());
        }
    }
    magnitudes
}

/// Mean absolute difference between two Sobel magnitude maps.
pub(crate) fn edge_difference(a_luma: &[u8], b_luma: &[u8], width: u32, height: u32) -> f64 {
    let ea = edge_magnitudes(a_luma, width, height);
    let eb = edge_magnitudes(b_luma, width, height);
    if ea.is_empty() {
        return 0.0;
    }

    let total: f64 = ea.iter().zip(eb.iter()).map(|(x, y)| (x - y).abs()).sum();
    total / ea.len() as f64
}
