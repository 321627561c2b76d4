//! Image normalization for the plant analyzer.
//!
//! Uploads are size-checked, decoded, turned upright per their EXIF
//! orientation, downsampled so neither side exceeds [`MAX_DIMENSION`],
//! flattened onto white and re-encoded as JPEG.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageReader, Rgba, RgbaImage};
use tracing::debug;

use greenthumb_core::image::{
    ImagePayload, JPEG_MIME_TYPE, JPEG_QUALITY, MAX_DIMENSION, MAX_UPLOAD_BYTES, fit_dimensions,
};
use greenthumb_core::{GreenThumbError, Result};

/// Converts arbitrary uploads into bounded JPEG payloads.
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    max_bytes: u64,
    max_dimension: u32,
    quality: u8,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            max_dimension: MAX_DIMENSION,
            quality: JPEG_QUALITY,
        }
    }
}

impl ImageNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes raw image bytes.
    ///
    /// # Returns
    ///
    /// - `Ok(ImagePayload)`: JPEG bytes with the output dimensions
    /// - `Err(GreenThumbError::TooLarge)`: Input above the byte ceiling (checked before decoding)
    /// - `Err(GreenThumbError::Decode)`: Input is not a readable image, or re-encoding failed
    pub fn normalize(&self, raw: &[u8]) -> Result<ImagePayload> {
        self.check_size(raw.len() as u64)?;

        let source = decode_upright(raw)?;

        let (width, height) = fit_dimensions(source.width(), source.height(), self.max_dimension);
        debug!(
            source_width = source.width(),
            source_height = source.height(),
            width,
            height,
            "Normalizing image"
        );

        let flattened = flatten_onto_white(&source);
        let resized = if (width, height) == (flattened.width(), flattened.height()) {
            DynamicImage::ImageRgba8(flattened)
        } else {
            DynamicImage::ImageRgba8(flattened).resize_exact(width, height, FilterType::Triangle)
        };

        let mut data = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut data, self.quality);
        encoder
            .encode_image(&DynamicImage::ImageRgb8(resized.to_rgb8()))
            .map_err(|e| GreenThumbError::decode(format!("Failed to encode JPEG: {}", e)))?;

        Ok(ImagePayload {
            data,
            mime_type: JPEG_MIME_TYPE.to_string(),
            width,
            height,
        })
    }

    /// Normalizes an image file, rejecting oversized files before reading them.
    pub fn normalize_file(&self, path: &Path) -> Result<ImagePayload> {
        let metadata = std::fs::metadata(path)?;
        self.check_size(metadata.len())?;

        let raw = std::fs::read(path)?;
        self.normalize(&raw)
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if size > self.max_bytes {
            return Err(GreenThumbError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Decodes `raw` and applies its EXIF orientation, so dimensions are those
/// of the image as it is meant to be viewed.
fn decode_upright(raw: &[u8]) -> Result<DynamicImage> {
    let mut decoder = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(decode_error)?
        .into_decoder()
        .map_err(decode_error)?;
    let orientation = decoder.orientation().map_err(decode_error)?;

    let mut source = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
    source.apply_orientation(orientation);
    Ok(source)
}

fn decode_error(e: impl std::fmt::Display) -> GreenThumbError {
    GreenThumbError::decode(format!("Failed to decode image: {}", e))
}

/// Composites every pixel over an opaque white background.
fn flatten_onto_white(source: &DynamicImage) -> RgbaImage {
    let rgba = source.to_rgba8();
    let mut flattened = RgbaImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = u16::from(pixel[3]);
        let blend = |channel: u8| -> u8 {
            (((u16::from(channel) * alpha) + (255 * (255 - alpha))) / 255) as u8
        };
        flattened.put_pixel(
            x,
            y,
            Rgba([blend(pixel[0]), blend(pixel[1]), blend(pixel[2]), 255]),
        );
    }
    flattened
}
