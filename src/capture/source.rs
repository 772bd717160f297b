//! Video sources
//!
//! A [`VideoSource`] hands out fully decoded RGB frames. Opening a source is a
//! separate step performed on the capture thread itself, so implementations
//! backed by thread-affine device handles need not be `Send`.

use image::{Rgb, RgbImage};

use super::error::CaptureError;

/// A camera, or anything that can stand in for one
pub trait VideoSource {
    /// Read one complete frame
    ///
    /// Blocks until the device delivers a frame. An error means this single
    /// frame is lost; the caller may keep reading.
    fn read_frame(&mut self) -> Result<RgbImage, CaptureError>;
}

/// Which device backs a camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// Synthetic moving colour bars
    TestPattern { width: u32, height: u32 },
    /// Local capture device by index (requires the `webcam` feature)
    Device(u32),
}

impl SourceSpec {
    /// Default synthetic source (640x480)
    pub fn test_pattern() -> Self {
        SourceSpec::TestPattern {
            width: 640,
            height: 480,
        }
    }

    /// Open the described source
    pub fn open(&self) -> Result<Box<dyn VideoSource>, CaptureError> {
        match *self {
            SourceSpec::TestPattern { width, height } => {
                Ok(Box::new(TestPatternSource::new(width, height)?))
            }
            SourceSpec::Device(index) => open_device(index),
        }
    }
}

impl std::fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceSpec::TestPattern { width, height } => {
                write!(f, "test-pattern {}x{}", width, height)
            }
            SourceSpec::Device(index) => write!(f, "device {}", index),
        }
    }
}

#[cfg(feature = "webcam")]
fn open_device(index: u32) -> Result<Box<dyn VideoSource>, CaptureError> {
    Ok(Box::new(super::webcam::WebcamSource::open(index)?))
}

#[cfg(not(feature = "webcam"))]
fn open_device(index: u32) -> Result<Box<dyn VideoSource>, CaptureError> {
    Err(CaptureError::SourceUnavailable(format!(
        "device {} requested but webcam support is not compiled in",
        index
    )))
}

const BAR_COLOURS: [[u8; 3]; 7] = [
    [192, 192, 192],
    [192, 192, 0],
    [0, 192, 192],
    [0, 192, 0],
    [192, 0, 192],
    [192, 0, 0],
    [0, 0, 192],
];

/// Synthetic source producing vertical colour bars that scroll sideways
///
/// Always opens, never fails a read. Useful without camera hardware and in
/// tests.
#[derive(Debug)]
pub struct TestPatternSource {
    width: u32,
    height: u32,
    offset: u32,
}

impl TestPatternSource {
    /// Create a pattern of the given size
    pub fn new(width: u32, height: u32) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::SourceUnavailable(format!(
                "invalid test pattern size {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            offset: 0,
        })
    }
}

impl VideoSource for TestPatternSource {
    fn read_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let bar_width = (self.width / BAR_COLOURS.len() as u32).max(1);
        let offset = self.offset;
        let image = RgbImage::from_fn(self.width, self.height, |x, _| {
            let bar = ((x + offset) / bar_width) as usize % BAR_COLOURS.len();
            Rgb(BAR_COLOURS[bar])
        });
        self.offset = (self.offset + 4) % self.width;
        Ok(image)
    }
}
