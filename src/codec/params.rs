//! Parameter types for pixel operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the orchestration layer (which decides what to transcode)
//! and the [`backend`](super::backend) (which does the actual pixel work).
//! This separation allows swapping backends (e.g. for testing with a mock)
//! without changing orchestration logic.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Quality from a settings value where `0` means "unset" and falls back
    /// to the stock encoder default of 75.
    pub fn from_setting(value: u32) -> Self {
        if value == 0 { Self::default() } else { Self::new(value) }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Background color composited under transparent source pixels.
///
/// JPEG has no alpha channel, so transparency must be flattened onto a
/// deterministic background before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FillColor {
    #[default]
    Black,
    White,
}

impl FillColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            FillColor::Black => [0, 0, 0],
            FillColor::White => [255, 255, 255],
        }
    }
}

/// Full specification for one JPEG encode.
///
/// The fields beyond `quality` mirror the advanced defaults of the mozjpeg
/// encoder the request format was designed for (progressive scan layout,
/// automatic chroma subsampling, quantization table variant 3). The pure-Rust
/// backend encodes baseline JPEG and honors `quality` only; the remaining
/// fields keep the request self-describing for backends that can use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub quality: Quality,
    pub progressive: bool,
    pub auto_subsample: bool,
    pub quant_table: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            progressive: true,
            auto_subsample: true,
            quant_table: 3,
        }
    }
}

impl EncodeOptions {
    pub fn with_quality(quality: Quality) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }
}
