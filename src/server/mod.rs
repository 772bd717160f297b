//! HTTP server
//!
//! Serves the camera dashboard, per-camera pages and the MJPEG feeds:
//!
//! ```text
//!   GET /                      dashboard, cameras in registry order
//!   GET /video_feed/{id}       multipart/x-mixed-replace MJPEG stream
//!   GET /video_stream/{id}     single-camera page embedding the feed
//! ```

pub mod config;
pub mod listener;
pub mod pages;
mod routes;

pub use config::{CameraConfig, ServerConfig, SourceKind};
pub use listener::NvrServer;
