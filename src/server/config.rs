//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::capture::{CaptureConfig, SourceSpec};
use crate::error::{Error, Result};
use crate::registry::CameraId;
use crate::stream::StreamConfig;

/// Environment variable holding the bind address
pub const ENV_BIND: &str = "NVR_BIND";
/// Environment variable listing cameras as `id=label,id=label`
pub const ENV_CAMERAS: &str = "NVR_CAMERAS";
/// Environment variable selecting the source kind (`test` or `webcam`)
pub const ENV_SOURCE: &str = "NVR_SOURCE";
/// Environment variable capping concurrent viewers
pub const ENV_MAX_VIEWERS: &str = "NVR_MAX_VIEWERS";
/// Environment variable setting the JPEG quality
pub const ENV_JPEG_QUALITY: &str = "NVR_JPEG_QUALITY";

/// One configured camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConfig {
    /// Camera identifier used in URLs
    pub id: CameraId,
    /// Human-readable label
    pub label: String,
    /// Backing video source
    pub source: SourceSpec,
}

impl CameraConfig {
    pub fn new(id: CameraId, label: impl Into<String>, source: SourceSpec) -> Self {
        Self {
            id,
            label: label.into(),
            source,
        }
    }
}

/// How cameras listed in the environment are backed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Synthetic test pattern per camera
    TestPattern,
    /// Local device whose index equals the camera id
    Webcam,
}

impl SourceKind {
    fn source_for(self, id: CameraId) -> SourceSpec {
        match self {
            SourceKind::TestPattern => SourceSpec::test_pattern(),
            SourceKind::Webcam => SourceSpec::Device(id.get()),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" | "test-pattern" => Ok(SourceKind::TestPattern),
            "webcam" | "device" => Ok(SourceKind::Webcam),
            other => Err(Error::Config(format!("unknown source kind '{}'", other))),
        }
    }
}

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Cameras in dashboard order
    pub cameras: Vec<CameraConfig>,

    /// Capture loop settings shared by all cameras
    pub capture: CaptureConfig,

    /// Viewer stream settings
    pub stream: StreamConfig,

    /// Maximum concurrent viewers across all cameras (0 = unlimited)
    pub max_viewers: usize,

    /// Stats logging interval
    pub stats_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            cameras: vec![CameraConfig::new(
                CameraId::new(0),
                "Camera 0",
                SourceSpec::test_pattern(),
            )],
            capture: CaptureConfig::default(),
            stream: StreamConfig::default(),
            max_viewers: 0, // Unlimited
            stats_interval: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Load configuration from `NVR_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_BIND) {
            config.bind_addr = addr
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}='{}': {}", ENV_BIND, addr, e)))?;
        }

        let kind = match lookup(ENV_SOURCE) {
            Some(kind) => kind.parse()?,
            None => SourceKind::TestPattern,
        };

        if let Some(cameras) = lookup(ENV_CAMERAS) {
            config.cameras = parse_cameras(&cameras, kind)?;
        } else if kind == SourceKind::Webcam {
            for camera in &mut config.cameras {
                camera.source = kind.source_for(camera.id);
            }
        }

        if let Some(max) = lookup(ENV_MAX_VIEWERS) {
            config.max_viewers = max
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}='{}': {}", ENV_MAX_VIEWERS, max, e)))?;
        }

        if let Some(quality) = lookup(ENV_JPEG_QUALITY) {
            let quality: u8 = quality
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("{}='{}': {}", ENV_JPEG_QUALITY, quality, e)))?;
            config.stream.jpeg_quality = quality;
        }

        Ok(config)
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Replace the camera list
    pub fn cameras(mut self, cameras: Vec<CameraConfig>) -> Self {
        self.cameras = cameras;
        self
    }

    /// Append a camera
    pub fn camera(mut self, camera: CameraConfig) -> Self {
        self.cameras.push(camera);
        self
    }

    /// Set capture settings
    pub fn capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }

    /// Set stream settings
    pub fn stream(mut self, stream: StreamConfig) -> Self {
        self.stream = stream;
        self
    }

    /// Set maximum concurrent viewers
    pub fn max_viewers(mut self, max: usize) -> Self {
        self.max_viewers = max;
        self
    }

    /// Set stats logging interval
    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }
}

/// Parse `id=label` pairs separated by commas, keeping their order
pub fn parse_cameras(spec: &str, kind: SourceKind) -> Result<Vec<CameraConfig>> {
    let mut cameras: Vec<CameraConfig> = Vec::new();

    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (id, label) = match item.split_once('=') {
            Some((id, label)) => (id.trim(), label.trim()),
            None => (item, ""),
        };
        let id: CameraId = id
            .parse()
            .map_err(|e| Error::Config(format!("camera id '{}': {}", id, e)))?;

        if cameras.iter().any(|c| c.id == id) {
            return Err(Error::Config(format!("camera {} listed twice", id)));
        }

        let label = if label.is_empty() {
            format!("Camera {}", id)
        } else {
            label.to_string()
        };
        cameras.push(CameraConfig::new(id, label, kind.source_for(id)));
    }

    if cameras.is_empty() {
        return Err(Error::Config(format!("{} lists no cameras", ENV_CAMERAS)));
    }

    Ok(cameras)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.cameras.len(), 1);
        assert_eq!(config.max_viewers, 0);
        assert_eq!(config.capture.frame_interval, Duration::from_millis(30));
        assert_eq!(config.stream.frame_interval, Duration::from_millis(50));
        assert_eq!(config.stream.empty_poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:5001".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .cameras(Vec::new())
            .camera(CameraConfig::new(
                CameraId::new(4),
                "Porch",
                SourceSpec::test_pattern(),
            ))
            .max_viewers(8)
            .stats_interval(Duration::from_secs(5));

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.cameras.len(), 1);
        assert_eq!(config.cameras[0].label, "Porch");
        assert_eq!(config.max_viewers, 8);
        assert_eq!(config.stats_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_cameras_keeps_order() {
        let cameras = parse_cameras("1=Living Room, 0=Bedroom,3", SourceKind::TestPattern).unwrap();

        let ids: Vec<u32> = cameras.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, [1, 0, 3]);
        assert_eq!(cameras[0].label, "Living Room");
        assert_eq!(cameras[1].label, "Bedroom");
        assert_eq!(cameras[2].label, "Camera 3");
    }

    #[test]
    fn test_parse_cameras_rejects_bad_input() {
        assert!(parse_cameras("x=Garage", SourceKind::TestPattern).is_err());
        assert!(parse_cameras("0=A,0=B", SourceKind::TestPattern).is_err());
        assert!(parse_cameras(" , ", SourceKind::TestPattern).is_err());
    }

    #[test]
    fn test_webcam_sources_use_camera_id() {
        let cameras = parse_cameras("0=Bedroom,2=Hall", SourceKind::Webcam).unwrap();
        assert_eq!(cameras[0].source, SourceSpec::Device(0));
        assert_eq!(cameras[1].source, SourceSpec::Device(2));
    }

    #[test]
    fn test_from_lookup() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_BIND, "127.0.0.1:9000"),
            (ENV_CAMERAS, "0=Bedroom,1=Living Room"),
            (ENV_MAX_VIEWERS, "10"),
            (ENV_JPEG_QUALITY, "65"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.cameras.len(), 2);
        assert_eq!(config.cameras[1].label, "Living Room");
        assert_eq!(config.max_viewers, 10);
        assert_eq!(config.stream.jpeg_quality, 65);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.cameras[0].source, SourceSpec::test_pattern());
    }

    #[test]
    fn test_from_lookup_errors() {
        let bad_addr = ServerConfig::from_lookup(lookup(&[(ENV_BIND, "nowhere")]));
        assert!(matches!(bad_addr, Err(Error::Config(_))));

        let bad_source = ServerConfig::from_lookup(lookup(&[(ENV_SOURCE, "vhs")]));
        assert!(matches!(bad_source, Err(Error::Config(_))));

        let bad_quality = ServerConfig::from_lookup(lookup(&[(ENV_JPEG_QUALITY, "300")]));
        assert!(matches!(bad_quality, Err(Error::Config(_))));
    }
}
