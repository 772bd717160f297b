//! Camera entry type
//!
//! This module defines the per-camera state stored in the registry.

use std::sync::Arc;

use crate::capture::{FrameSlot, WorkerHandle, WorkerState};
use crate::stats::{CameraMetrics, CameraStats};

use super::camera::CameraDescriptor;

/// Entry for a single camera in the registry
#[derive(Debug)]
pub struct CameraEntry {
    /// Id and label
    pub descriptor: CameraDescriptor,

    /// Latest frame, written only by this camera's worker
    pub(super) slot: Arc<FrameSlot>,

    /// Counters shared with the worker and viewer sessions
    pub(super) metrics: Arc<CameraMetrics>,

    /// Capture worker control
    pub(super) worker: WorkerHandle,
}

impl CameraEntry {
    /// Shared handle to the frame slot
    pub fn slot(&self) -> Arc<FrameSlot> {
        Arc::clone(&self.slot)
    }

    /// Shared handle to the camera counters
    pub fn metrics(&self) -> Arc<CameraMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Capture worker state
    pub fn state(&self) -> WorkerState {
        self.worker.state()
    }

    /// Current statistics
    pub fn stats(&self) -> CameraStats {
        self.metrics.snapshot()
    }
}
