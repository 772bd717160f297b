//! Statistics for cameras and viewer sessions

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::time::Duration;

use crate::capture::WorkerState;

/// Live per-camera counters
///
/// Written by the capture worker and by viewer sessions; lock-free so that
/// reading stats never contends with the frame slot.
#[derive(Debug)]
pub struct CameraMetrics {
    state: AtomicU8,
    frames_captured: AtomicU64,
    read_failures: AtomicU64,
    viewers: AtomicU32,
}

impl CameraMetrics {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(WorkerState::Starting.as_u8()),
            frames_captured: AtomicU64::new(0),
            read_failures: AtomicU64::new(0),
            viewers: AtomicU32::new(0),
        }
    }

    /// Current worker state
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: WorkerState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    pub(crate) fn record_capture(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read_failure(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Register a viewer; returns the new viewer count
    pub(crate) fn viewer_joined(&self) -> u32 {
        self.viewers.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Unregister a viewer; returns the new viewer count
    pub(crate) fn viewer_left(&self) -> u32 {
        self.viewers.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }

    /// Number of connected viewers
    pub fn viewers(&self) -> u32 {
        self.viewers.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> CameraStats {
        CameraStats {
            state: self.state(),
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            viewers: self.viewers(),
        }
    }
}

impl Default for CameraMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a camera's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraStats {
    /// Capture worker state
    pub state: WorkerState,
    /// Frames published since startup
    pub frames_captured: u64,
    /// Reads that failed and were skipped
    pub read_failures: u64,
    /// Connected viewers
    pub viewers: u32,
}

impl CameraStats {
    /// Whether the camera will never produce frames (source failed to open)
    pub fn is_offline(&self) -> bool {
        self.state == WorkerState::Failed
    }
}

/// Per-viewer counters
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Multipart chunks delivered to the transport
    pub chunks_sent: u64,
    /// Total chunk bytes delivered
    pub bytes_sent: u64,
    /// Frames that could not be encoded
    pub encode_failures: u64,
    /// Session duration
    pub duration: Duration,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Average delivered frame rate
    pub fn frame_rate(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.chunks_sent as f64 / secs
        } else {
            0.0
        }
    }

    /// Average throughput in bits per second
    pub fn bitrate(&self) -> u64 {
        let secs = self.duration.as_secs();
        if secs > 0 {
            (self.bytes_sent * 8) / secs
        } else {
            0
        }
    }
}
