//! Per-camera capture loop
//!
//! One [`CaptureWorker`] per camera runs on its own named OS thread:
//!
//! ```text
//!   Starting ──open ok──► Running ──shutdown──► Stopped
//!      │
//!      └──open failed──► Failed (terminal, slot stays empty)
//! ```
//!
//! While running it loops read → stamp → publish → sleep. A failed read is
//! logged and skipped; only complete frames are ever published.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;

use crate::registry::CameraDescriptor;
use crate::stats::CameraMetrics;

use super::error::CaptureError;
use super::frame::Frame;
use super::overlay::{self, OverlayStyle};
use super::slot::FrameSlot;
use super::source::VideoSource;

/// Lifecycle of a capture worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Opening the video source
    Starting,
    /// Capturing frames
    Running,
    /// The source could not be opened; the worker has exited
    Failed,
    /// Shut down on request
    Stopped,
}

impl WorkerState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            WorkerState::Starting => 0,
            WorkerState::Running => 1,
            WorkerState::Failed => 2,
            WorkerState::Stopped => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => WorkerState::Running,
            2 => WorkerState::Failed,
            3 => WorkerState::Stopped,
            _ => WorkerState::Starting,
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerState::Starting => "starting",
            WorkerState::Running => "running",
            WorkerState::Failed => "failed",
            WorkerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Capture loop settings
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Pause after each read; caps loop CPU usage, not a precise frame clock
    pub frame_interval: Duration,
    /// Label/timestamp placement
    pub overlay: OverlayStyle,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(30),
            overlay: OverlayStyle::default(),
        }
    }
}

impl CaptureConfig {
    /// Set the pause between reads
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the overlay style
    pub fn overlay(mut self, style: OverlayStyle) -> Self {
        self.overlay = style;
        self
    }
}

/// Handle kept by the registry for a spawned worker
///
/// Dropping the handle does not stop the worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    stop: Arc<AtomicBool>,
    metrics: Arc<CameraMetrics>,
}

impl WorkerHandle {
    /// Ask the worker to exit after its current cycle
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        self.metrics.state()
    }
}

/// Keeps one [`FrameSlot`] fed from one [`VideoSource`]
pub struct CaptureWorker {
    camera: CameraDescriptor,
    slot: Arc<FrameSlot>,
    metrics: Arc<CameraMetrics>,
    config: CaptureConfig,
    stop: Arc<AtomicBool>,
}

impl CaptureWorker {
    /// Create a worker publishing into `slot`
    pub fn new(
        camera: CameraDescriptor,
        slot: Arc<FrameSlot>,
        metrics: Arc<CameraMetrics>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            camera,
            slot,
            metrics,
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the worker on a dedicated thread named `capture-<id>`
    ///
    /// `open` runs on that thread; its failure leaves the worker `Failed`.
    pub fn spawn<F>(self, open: F) -> std::io::Result<WorkerHandle>
    where
        F: FnOnce() -> Result<Box<dyn VideoSource>, CaptureError> + Send + 'static,
    {
        let handle = WorkerHandle {
            stop: Arc::clone(&self.stop),
            metrics: Arc::clone(&self.metrics),
        };

        self.metrics.set_state(WorkerState::Starting);
        thread::Builder::new()
            .name(format!("capture-{}", self.camera.id))
            .spawn(move || self.run(open))?;

        Ok(handle)
    }

    fn run<F>(self, open: F)
    where
        F: FnOnce() -> Result<Box<dyn VideoSource>, CaptureError>,
    {
        let mut source = match open() {
            Ok(source) => source,
            Err(e) => {
                tracing::error!(
                    camera = %self.camera.id,
                    label = %self.camera.label,
                    error = %e,
                    "Failed to open video source, camera stays offline"
                );
                self.metrics.set_state(WorkerState::Failed);
                return;
            }
        };

        self.metrics.set_state(WorkerState::Running);
        tracing::info!(
            camera = %self.camera.id,
            label = %self.camera.label,
            "Capture started"
        );

        let mut seq = 0u64;
        while !self.stop.load(Ordering::Relaxed) {
            match source.read_frame() {
                Ok(mut image) => {
                    let now = Local::now();
                    let text = overlay::caption(&self.camera.label, now);
                    overlay::stamp(&mut image, &text, &self.config.overlay);

                    seq += 1;
                    self.slot.publish(Frame::new(seq, now, image));
                    self.metrics.record_capture();
                }
                Err(e) => {
                    self.metrics.record_read_failure();
                    tracing::warn!(camera = %self.camera.id, error = %e, "Frame read failed");
                }
            }

            thread::sleep(self.config.frame_interval);
        }

        self.metrics.set_state(WorkerState::Stopped);
        tracing::info!(camera = %self.camera.id, frames = seq, "Capture stopped");
    }
}
