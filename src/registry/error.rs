//! Registry error types
//!
//! Error types for camera registry operations.

use super::camera::CameraId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No camera with this id is configured
    CameraNotFound(CameraId),
    /// A camera with this id is already registered
    DuplicateCamera(CameraId),
    /// The capture thread could not be started
    WorkerSpawn(CameraId, String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::CameraNotFound(id) => write!(f, "Camera not found: {}", id),
            RegistryError::DuplicateCamera(id) => write!(f, "Camera already registered: {}", id),
            RegistryError::WorkerSpawn(id, reason) => {
                write!(f, "Failed to start capture for camera {}: {}", id, reason)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
