//! Captured frame snapshot

use std::sync::Arc;

use chrono::{DateTime, Local};
use image::RgbImage;

/// An annotated frame as published by a capture worker
///
/// Cheap to clone: the pixel buffer is shared behind an `Arc` and never
/// mutated after construction. A newer frame replaces an older one entirely.
#[derive(Debug, Clone)]
pub struct Frame {
    seq: u64,
    captured_at: DateTime<Local>,
    image: Arc<RgbImage>,
}

impl Frame {
    /// Create a frame from a fully decoded and annotated image
    pub fn new(seq: u64, captured_at: DateTime<Local>, image: RgbImage) -> Self {
        Self {
            seq,
            captured_at,
            image: Arc::new(image),
        }
    }

    /// Per-camera sequence number, starting at 1
    ///
    /// Two frames from the same slot with equal `seq` are the same frame.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Local wall-clock time the frame was read
    pub fn captured_at(&self) -> DateTime<Local> {
        self.captured_at
    }

    /// Pixel data
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
