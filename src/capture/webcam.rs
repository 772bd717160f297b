//! Local capture devices via `nokhwa`

use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use super::error::CaptureError;
use super::source::VideoSource;

/// A webcam opened by device index
pub struct WebcamSource {
    index: u32,
    camera: Camera,
}

impl WebcamSource {
    /// Open device `index` at its highest available frame rate and start streaming
    pub fn open(index: u32) -> Result<Self, CaptureError> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), format)
            .map_err(|e| CaptureError::SourceUnavailable(format!("device {}: {}", index, e)))?;
        camera
            .open_stream()
            .map_err(|e| CaptureError::SourceUnavailable(format!("device {}: {}", index, e)))?;

        tracing::debug!(device = index, "Webcam stream opened");
        Ok(Self { index, camera })
    }
}

impl VideoSource for WebcamSource {
    fn read_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::ReadFailed(format!("device {}: {}", self.index, e)))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::ReadFailed(format!("device {}: {}", self.index, e)))?;

        // nokhwa may link a different `image` release; move the raw pixels across
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw()).ok_or_else(|| {
            CaptureError::ReadFailed(format!(
                "device {}: short frame buffer for {}x{}",
                self.index, width, height
            ))
        })
    }
}

impl Drop for WebcamSource {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::debug!(device = self.index, error = %e, "Failed to stop webcam stream");
        }
    }
}
