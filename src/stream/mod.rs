//! MJPEG streaming
//!
//! This module provides:
//! - The multipart wire format (`--frame` parts carrying one JPEG each)
//! - The JPEG encoder boundary
//! - The per-viewer [`StreamBroadcaster`] and its [`MjpegStream`]

pub mod broadcaster;
pub mod encoder;
pub mod multipart;

pub use broadcaster::{MjpegStream, StreamBroadcaster, StreamConfig};
pub use encoder::{EncodeError, FrameEncoder, JpegEncoder};
