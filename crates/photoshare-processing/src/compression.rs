//! JPEG encoding through mozjpeg

use crate::error::{ProcessingError, ProcessingResult};
use bytes::Bytes;
use image::RgbImage;

/// Compress an RGB image to a baseline JPEG with optimized Huffman tables
///
/// `quality` is on the usual 1-100 scale.
pub fn compress_jpeg(rgb_img: &RgbImage, quality: u8) -> ProcessingResult<Bytes> {
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    // Fastest profile keeps mozjpeg from switching to progressive scans
    comp.set_fastest_defaults();
    comp.set_size(width as usize, height as usize);
    comp.set_quality(quality as f32);
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| ProcessingError::Encode(e.to_string()))?;
    comp.write_scanlines(rgb_img.as_raw())
        .map_err(|e| ProcessingError::Encode(e.to_string()))?;
    let jpeg_data = comp
        .finish()
        .map_err(|e| ProcessingError::Encode(e.to_string()))?;

    Ok(Bytes::from(jpeg_data))
}
