//! Camera identity types

use std::str::FromStr;

/// Identifier of a configured camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(u32);

impl CameraId {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CameraId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a camera id is not a canonical decimal number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCameraIdError(String);

impl std::fmt::Display for ParseCameraIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid camera id '{}'", self.0)
    }
}

impl std::error::Error for ParseCameraIdError {}

impl FromStr for CameraId {
    type Err = ParseCameraIdError;

    /// Digits only, no sign, whitespace or leading zeros
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseCameraIdError(s.to_string());
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if s.len() > 1 && s.starts_with('0') {
            return Err(invalid());
        }
        s.parse().map(CameraId).map_err(|_| invalid())
    }
}

impl From<u32> for CameraId {
    fn from(id: u32) -> Self {
        CameraId(id)
    }
}

/// Static description of a camera (id + human-readable label)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDescriptor {
    /// Camera identifier used in URLs
    pub id: CameraId,
    /// Label shown on the dashboard and stamped onto frames
    pub label: String,
}

impl CameraDescriptor {
    /// Create a new descriptor
    pub fn new(id: CameraId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camera_id() {
        assert_eq!("3".parse::<CameraId>().unwrap(), CameraId::new(3));
        assert_eq!("0".parse::<CameraId>().unwrap(), CameraId::new(0));
        assert_eq!("12".parse::<CameraId>().unwrap().get(), 12);
        assert!("front-door".parse::<CameraId>().is_err());
        assert!("-1".parse::<CameraId>().is_err());
        assert!("".parse::<CameraId>().is_err());
        assert!("99999999999".parse::<CameraId>().is_err());
    }

    #[test]
    fn test_parse_camera_id_is_strict() {
        for text in [" 7", "7 ", "+7", "007", "07", "7a"] {
            let err = text.parse::<CameraId>().unwrap_err();
            assert_eq!(err.to_string(), format!("invalid camera id '{}'", text));
        }
    }

    #[test]
    fn test_display() {
        let camera = CameraDescriptor::new(CameraId::new(1), "Living Room");
        assert_eq!(camera.id.to_string(), "1");
        assert_eq!(camera.label, "Living Room");
    }
}
