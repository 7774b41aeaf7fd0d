//! Image pre-processing for crop photo uploads.
//!
//! Crop photos come straight off phone cameras and are far larger than the
//! advisory endpoint needs. [`compress`] bounds the upload: decode, scale
//! proportionally so neither dimension exceeds the cap, re-encode as JPEG
//! at the configured quality. The output keeps the logical file name of the
//! input so upstream storage keys stay stable.
//!
//! Deterministic given identical input bytes, dimension cap, and quality.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::error::AdvisoryError;

/// A re-encoded image ready for upload.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    /// Logical name carried over from the input file.
    pub file_name: String,
    /// JPEG bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CompressedImage {
    /// Base64 payload form expected by the `/query` endpoint.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Decode `bytes`, downscale so neither dimension exceeds `max_dimension`
/// (aspect ratio preserved, never upscales), and re-encode as JPEG at
/// `quality` (1–100).
///
/// # Errors
///
/// [`AdvisoryError::Decode`] when the input is not a readable image or the
/// re-encode fails.
pub fn compress(
    bytes: &[u8],
    file_name: &str,
    max_dimension: u32,
    quality: u8,
) -> Result<CompressedImage, AdvisoryError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AdvisoryError::Decode(format!("{file_name}: {e}")))?;

    let scaled = if decoded.width() > max_dimension || decoded.height() > max_dimension {
        decoded.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        decoded
    };

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = scaled.to_rgb8();
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| AdvisoryError::Decode(format!("{file_name}: re-encode failed: {e}")))?;

    Ok(CompressedImage {
        file_name: file_name.to_string(),
        bytes: out,
        width: rgb.width(),
        height: rgb.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    // Busy per-pixel pattern: PNG can't compress it well, so the JPEG
    // re-encode at q80 is reliably smaller, like a real photograph.
    fn photo_like_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let r = ((x * 37 + y * 17) % 251) as u8;
            let g = ((x * 13 + y * 41) % 239) as u8;
            let b = ((x.wrapping_mul(y) + 97) % 241) as u8;
            image::Rgb([r, g, b])
        });
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn caps_max_dimension_and_shrinks_bytes() {
        let input = photo_like_png(1280, 720);
        let out = compress(&input, "field.png", 800, 80).unwrap();
        assert!(out.width <= 800 && out.height <= 800);
        assert!(out.width == 800 || out.height == 800);
        assert!(
            out.bytes.len() < input.len(),
            "expected {} < {}",
            out.bytes.len(),
            input.len()
        );
        assert_eq!(out.file_name, "field.png");
    }

    #[test]
    fn preserves_aspect_ratio() {
        let input = photo_like_png(1600, 400);
        let out = compress(&input, "wide.png", 800, 80).unwrap();
        assert_eq!(out.width, 800);
        assert_eq!(out.height, 200);
    }

    #[test]
    fn never_upscales_small_input() {
        let input = photo_like_png(320, 240);
        let out = compress(&input, "small.png", 800, 80).unwrap();
        assert_eq!((out.width, out.height), (320, 240));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let input = photo_like_png(900, 900);
        let a = compress(&input, "a.png", 800, 80).unwrap();
        let b = compress(&input, "a.png", 800, 80).unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[test]
    fn unreadable_input_is_decode_error() {
        let err = compress(b"not an image at all", "junk.bin", 800, 80).unwrap_err();
        assert!(matches!(err, AdvisoryError::Decode(_)));
    }
}
