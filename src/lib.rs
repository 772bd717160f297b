//! mjpeg-nvr: a small network video recorder
//!
//! Continuously captures frames from several local video sources, stamps each
//! frame with the camera label and the local time, and serves every camera as
//! an independent MJPEG (`multipart/x-mixed-replace`) stream to any number of
//! concurrent viewers.
//!
//! # Architecture
//!
//! ```text
//!   VideoSource ──► CaptureWorker ──► FrameSlot ◄── sampled by ── StreamSession ──► viewer
//!   (blocking)      (OS thread,       (latest      (one tokio task per viewer,
//!                    annotate)         wins)        bounded rate)
//! ```
//!
//! Each camera owns exactly one capture thread and one [`FrameSlot`]. Viewers
//! never push back on capture: a slow viewer only slows its own session, and
//! intermediate frames are simply skipped.
//!
//! # Example
//!
//! ```no_run
//! use mjpeg_nvr::{NvrServer, ServerConfig};
//!
//! # async fn example() -> mjpeg_nvr::error::Result<()> {
//! let config = ServerConfig::from_env()?;
//! let server = NvrServer::new(config)?;
//! server.run().await
//! # }
//! ```

pub mod capture;
pub mod error;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;
pub mod stream;

pub use capture::{Frame, FrameSlot, VideoSource};
pub use registry::{CameraDescriptor, CameraId, CameraRegistry};
pub use server::{NvrServer, ServerConfig};
pub use stream::{MjpegStream, StreamBroadcaster};
