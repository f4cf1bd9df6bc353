//! Thumbnail transformation
//!
//! decode → flatten alpha onto white → fit within a square box → baseline JPEG.
//!
//! Everything here is CPU-bound and blocking. Async callers should run
//! [`ThumbnailTransformer::generate`] through `tokio::task::spawn_blocking`.

use crate::compression::compress_jpeg;
use crate::error::{ProcessingError, ProcessingResult};
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader, Rgb, RgbImage};
use photoshare_core::constants::{DEFAULT_THUMBNAIL_MAX_DIMENSION, DEFAULT_THUMBNAIL_QUALITY};
use photoshare_core::Config;
use std::io::Cursor;
use tracing::debug;

/// Configuration for thumbnail generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSettings {
    /// Side of the bounding box in pixels
    pub max_dimension: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_THUMBNAIL_MAX_DIMENSION,
            quality: DEFAULT_THUMBNAIL_QUALITY,
        }
    }
}

impl ThumbnailSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_dimension: config.thumbnail_max_dimension,
            quality: config.thumbnail_quality,
        }
    }

    /// Nominal box recorded in thumbnail metadata, e.g. `150x150`
    pub fn size_label(&self) -> String {
        format!("{}x{}", self.max_dimension, self.max_dimension)
    }

    fn validate(&self) -> ProcessingResult<()> {
        if self.max_dimension == 0 {
            return Err(ProcessingError::InvalidSettings(
                "max_dimension must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ProcessingError::InvalidSettings(format!(
                "quality {} outside 1-100",
                self.quality
            )));
        }
        Ok(())
    }
}

/// An encoded thumbnail
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// JPEG bytes
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

/// Dimensions that fit `width`×`height` inside a `max`×`max` box, keeping aspect ratio.
///
/// The longest side becomes `max`, the other is rounded and never below 1 px.
/// Images already inside the box keep their size.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }

    let scale = max as f64 / width.max(height) as f64;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max);
    (scaled(width), scaled(height))
}

/// Composite an image onto an opaque white background using its alpha as the mask
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Thumbnail generator for a fixed set of settings
#[derive(Debug, Clone, Copy, Default)]
pub struct ThumbnailTransformer {
    settings: ThumbnailSettings,
}

impl ThumbnailTransformer {
    pub fn new(settings: ThumbnailSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    /// Generate a thumbnail from encoded image bytes (JPEG, PNG, GIF or WebP)
    pub fn generate(&self, original_data: &[u8]) -> ProcessingResult<Thumbnail> {
        self.settings.validate()?;

        let img = ImageReader::new(Cursor::new(original_data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let (orig_w, orig_h) = img.dimensions();
        if orig_w == 0 || orig_h == 0 {
            return Err(ProcessingError::Decode("image has no pixels".to_string()));
        }
        let has_alpha = img.color().has_alpha();
        debug!(
            original_width = orig_w,
            original_height = orig_h,
            has_alpha = has_alpha,
            "Processing image for thumbnail"
        );

        let rgb = if has_alpha {
            flatten_onto_white(&img)
        } else {
            img.to_rgb8()
        };

        let (new_w, new_h) = fit_within(orig_w, orig_h, self.settings.max_dimension);
        let resized = if (new_w, new_h) == (orig_w, orig_h) {
            rgb
        } else {
            image::imageops::resize(&rgb, new_w, new_h, FilterType::Lanczos3)
        };

        let data = compress_jpeg(&resized, self.settings.quality)?;

        debug!(
            width = new_w,
            height = new_h,
            size = data.len(),
            "Thumbnail generated"
        );

        Ok(Thumbnail {
            data,
            width: new_w,
            height: new_h,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, ImageFormat, LumaA, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    #[test]
    fn test_fit_within_landscape_and_portrait() {
        assert_eq!(fit_within(1200, 800, 150), (150, 100));
        assert_eq!(fit_within(800, 1200, 150), (100, 150));
        assert_eq!(fit_within(3000, 3000, 150), (150, 150));
    }

    #[test]
    fn test_fit_within_never_upscales() {
        assert_eq!(fit_within(100, 40, 150), (100, 40));
        assert_eq!(fit_within(150, 150, 150), (150, 150));
    }

    #[test]
    fn test_fit_within_keeps_one_pixel_minimum() {
        assert_eq!(fit_within(10_000, 10, 150), (150, 1));
        assert_eq!(fit_within(3, 4000, 150), (1, 150));
    }

    #[test]
    fn test_generate_fits_box_and_outputs_jpeg() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([30, 90, 160])));
        let png = encode(img, ImageFormat::Png);

        let thumb = ThumbnailTransformer::default().generate(&png).unwrap();

        assert_eq!((thumb.width, thumb.height), (150, 113));
        assert_eq!(image::guess_format(&thumb.data).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&thumb.data).unwrap();
        assert_eq!(decoded.dimensions(), (150, 113));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_transparent_regions_render_white() {
        let mut img = RgbaImage::from_pixel(300, 300, Rgba([0, 0, 0, 0]));
        for x in 0..150 {
            for y in 0..300 {
                img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let png = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);

        let thumb = ThumbnailTransformer::default().generate(&png).unwrap();
        let decoded = image::load_from_memory(&thumb.data).unwrap().to_rgb8();

        let Rgb([r, g, b]) = *decoded.get_pixel(140, 75);
        assert!(r > 240 && g > 240 && b > 240, "expected white, got {:?}", (r, g, b));
        let Rgb([r, g, b]) = *decoded.get_pixel(10, 75);
        assert!(r < 30 && g < 30 && b > 220, "expected blue, got {:?}", (r, g, b));
    }

    #[test]
    fn test_transparent_gif_palette_renders_white() {
        let img = RgbaImage::from_fn(300, 300, |x, _| {
            if x < 150 {
                Rgba([200, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let gif = encode(DynamicImage::ImageRgba8(img), ImageFormat::Gif);
        assert!(image::load_from_memory(&gif).unwrap().color().has_alpha());

        let thumb = ThumbnailTransformer::default().generate(&gif).unwrap();
        let decoded = image::load_from_memory(&thumb.data).unwrap();
        assert!(!decoded.color().has_alpha());

        let rgb = decoded.to_rgb8();
        let Rgb([r, g, b]) = *rgb.get_pixel(140, 75);
        assert!(r > 240 && g > 240 && b > 240, "expected white, got {:?}", (r, g, b));
        let Rgb([r, g, b]) = *rgb.get_pixel(10, 75);
        assert!(r > 170 && g < 40 && b < 40, "expected red, got {:?}", (r, g, b));
    }

    #[test]
    fn test_grayscale_alpha_renders_white() {
        let img = GrayAlphaImage::from_fn(200, 100, |x, _| {
            if x < 100 {
                LumaA([20, 255])
            } else {
                LumaA([20, 0])
            }
        });
        let png = encode(DynamicImage::ImageLumaA8(img), ImageFormat::Png);

        let thumb = ThumbnailTransformer::default().generate(&png).unwrap();
        assert_eq!((thumb.width, thumb.height), (150, 75));
        let decoded = image::load_from_memory(&thumb.data).unwrap();
        assert!(!decoded.color().has_alpha());

        let rgb = decoded.to_rgb8();
        let Rgb([r, g, b]) = *rgb.get_pixel(140, 40);
        assert!(r > 240 && g > 240 && b > 240, "expected white, got {:?}", (r, g, b));
        let Rgb([r, _, _]) = *rgb.get_pixel(10, 40);
        assert!(r < 50, "expected dark gray, got {}", r);
    }

    #[test]
    fn test_flatten_blends_partial_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let flat = flatten_onto_white(&img);
        assert_eq!(flat.get_pixel(0, 0).0, [127, 127, 127]);
    }

    #[test]
    fn test_small_images_keep_their_size() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(40, 20, image::Luma([90])));
        let jpeg = encode(DynamicImage::ImageRgb8(img.to_rgb8()), ImageFormat::Jpeg);

        let thumb = ThumbnailTransformer::default().generate(&jpeg).unwrap();
        assert_eq!((thumb.width, thumb.height), (40, 20));
    }

    #[test]
    fn test_non_image_bytes_fail_to_decode() {
        let result = ThumbnailTransformer::default().generate(b"definitely not an image");
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config {
            thumbnail_max_dimension: 64,
            thumbnail_quality: 70,
            ..Config::default()
        };
        let settings = ThumbnailSettings::from_config(&config);
        assert_eq!(settings, ThumbnailSettings { max_dimension: 64, quality: 70 });
        assert_eq!(ThumbnailSettings::default().size_label(), "150x150");

        let bad = ThumbnailTransformer::new(ThumbnailSettings { max_dimension: 0, quality: 85 });
        assert!(matches!(
            bad.generate(b"irrelevant"),
            Err(ProcessingError::InvalidSettings(_))
        ));
    }
}
