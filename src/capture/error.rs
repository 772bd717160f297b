//! Capture error types

/// Error type for video source operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The device could not be opened; fatal for the worker
    SourceUnavailable(String),
    /// A single frame read failed; the worker skips it
    ReadFailed(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::SourceUnavailable(reason) => {
                write!(f, "Video source unavailable: {}", reason)
            }
            CaptureError::ReadFailed(reason) => write!(f, "Frame read failed: {}", reason),
        }
    }
}

impl std::error::Error for CaptureError {}
