//! Pixel backend trait and shared types.
//!
//! The [`CodecBackend`] trait defines the three pixel operations the pipeline
//! needs: decode (with transparency flattening), resize, and JPEG encode.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, zero
//! external dependencies. Everything is statically linked into the binary.

use super::params::{EncodeOptions, FillColor};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    #[error("encode failed: {0}")]
    EncodeFailed(String),
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
}

/// An owned raw RGB pixel buffer.
///
/// Buffers are moved, never shared: the orchestrator moves one into the
/// worker boundary per request and receives encoded bytes back. Width and
/// height are always positive and `data.len() == width * height * 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * 3);
        Self {
            width,
            height,
            data,
        }
    }
}

/// Trait for pixel processing backends.
///
/// Every backend must implement all three operations so the rest of the
/// codebase is backend-agnostic. Implementations must be `Send + Sync`: the
/// worker boundary runs them on a dedicated thread.
pub trait CodecBackend: Send + Sync {
    /// Decode encoded image bytes to raw pixels, compositing any transparent
    /// pixels over `fill` (JPEG output has no alpha channel).
    fn decode_over_fill(&self, bytes: &[u8], fill: FillColor) -> Result<PixelBuffer, BackendError>;

    /// Resample a pixel buffer to the given dimensions.
    fn resize(&self, pixels: PixelBuffer, width: u32, height: u32)
    -> Result<PixelBuffer, BackendError>;

    /// Encode a pixel buffer as JPEG.
    fn encode(&self, pixels: PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>, BackendError>;
}
