//! Pure Rust pixel backend — zero external dependencies.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::load_from_memory` |
//! | Transparency flattening | alpha blend over [`FillColor`] |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (baseline) |

use super::backend::{BackendError, CodecBackend, PixelBuffer};
use super::params::{EncodeOptions, FillColor};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, RgbImage};

/// File extensions whose decoders are compiled in.
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "tif", "tiff", "webp", "gif", "bmp"];

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecBackend for RustBackend {
    fn decode_over_fill(&self, bytes: &[u8], fill: FillColor) -> Result<PixelBuffer, BackendError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| BackendError::DecodeFailed(e.to_string()))?;

        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        let [fr, fg, fb] = fill.rgb().map(|c| c as u16);

        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let a = a as u16;
            // Source-over blend onto the opaque fill background.
            data.push(((r as u16 * a + fr * (255 - a)) / 255) as u8);
            data.push(((g as u16 * a + fg * (255 - a)) / 255) as u8);
            data.push(((b as u16 * a + fb * (255 - a)) / 255) as u8);
        }

        Ok(PixelBuffer::new(width, height, data))
    }

    fn resize(
        &self,
        pixels: PixelBuffer,
        width: u32,
        height: u32,
    ) -> Result<PixelBuffer, BackendError> {
        let img = RgbImage::from_raw(pixels.width, pixels.height, pixels.data).ok_or_else(|| {
            BackendError::ProcessingFailed("pixel buffer does not match its dimensions".into())
        })?;
        let resized = image::imageops::resize(&img, width, height, FilterType::Lanczos3);
        Ok(PixelBuffer::new(width, height, resized.into_raw()))
    }

    fn encode(&self, pixels: PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>, BackendError> {
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, options.quality.value() as u8)
            .write_image(
                &pixels.data,
                pixels.width,
                pixels.height,
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| BackendError::EncodeFailed(e.to_string()))?;
        Ok(out)
    }
}
