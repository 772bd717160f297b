//! Camera and viewer statistics

pub mod metrics;

pub use metrics::{CameraMetrics, CameraStats, SessionStats};
