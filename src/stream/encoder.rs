//! Frame encoding
//!
//! The codec is a boundary: anything that turns an RGB raster into JPEG bytes
//! can stand behind [`FrameEncoder`]. The default uses the `image` crate.

use bytes::Bytes;
use image::codecs::jpeg;
use image::RgbImage;

/// JPEG encode failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError(pub String);

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame encoding failed: {}", self.0)
    }
}

impl std::error::Error for EncodeError {}

/// Turns a raster into the bytes placed in a multipart part
pub trait FrameEncoder: Send + Sync {
    fn encode(&self, image: &RgbImage) -> Result<Bytes, EncodeError>;
}

/// Baseline JPEG encoder
#[derive(Debug, Clone, Copy)]
pub struct JpegEncoder {
    quality: u8,
}

impl JpegEncoder {
    /// Create an encoder; quality is clamped to 1..=100
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self::new(80)
    }
}

impl FrameEncoder for JpegEncoder {
    fn encode(&self, image: &RgbImage) -> Result<Bytes, EncodeError> {
        let mut out = Vec::with_capacity(image.as_raw().len() / 8);
        jpeg::JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode_image(image)
            .map_err(|e| EncodeError(e.to_string()))?;
        Ok(Bytes::from(out))
    }
}
