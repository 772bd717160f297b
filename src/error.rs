//! Crate-level error type

use crate::capture::CaptureError;
use crate::registry::{CameraId, RegistryError};
use crate::stream::EncodeError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error
#[derive(Debug)]
pub enum Error {
    /// Socket or thread I/O failure
    Io(std::io::Error),
    /// Camera lookup or registration failure
    Registry(RegistryError),
    /// Video source failure
    Capture(CaptureError),
    /// Frame could not be encoded
    Encode(EncodeError),
    /// Invalid configuration value
    Config(String),
    /// The global viewer limit is exhausted
    ViewerLimitReached(CameraId),
}

impl Error {
    /// Whether this error means the requested camera does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Registry(RegistryError::CameraNotFound(_)))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Registry(e) => write!(f, "{}", e),
            Error::Capture(e) => write!(f, "{}", e),
            Error::Encode(e) => write!(f, "{}", e),
            Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::ViewerLimitReached(id) => {
                write!(f, "Viewer limit reached, rejected viewer of camera {}", id)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Registry(e) => Some(e),
            Error::Capture(e) => Some(e),
            Error::Encode(e) => Some(e),
            Error::Config(_) | Error::ViewerLimitReached(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<CaptureError> for Error {
    fn from(e: CaptureError) -> Self {
        Error::Capture(e)
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Error::Encode(e)
    }
}
