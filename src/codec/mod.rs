//! Pixel processing — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` (JPEG, PNG, TIFF, WebP, GIF, BMP) |
//! | **Flatten transparency** | alpha blend over a [`FillColor`] background |
//! | **Resize** | Lanczos3 resampling |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing pixel operations
//! - **Backend**: [`CodecBackend`] trait + [`RustBackend`]

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, CodecBackend, PixelBuffer};
pub use params::{EncodeOptions, FillColor, Quality};
pub use rust_backend::{RustBackend, SUPPORTED_INPUT_EXTENSIONS};
