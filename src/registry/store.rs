//! Camera registry implementation
//!
//! The process-wide table of cameras. Cameras are registered during startup
//! through `&mut self`; once the registry is shared behind an `Arc` its shape
//! can no longer change, so lookups need no lock.

use std::collections::HashMap;
use std::sync::Arc;

use crate::capture::{CaptureConfig, CaptureError, CaptureWorker, FrameSlot, VideoSource};
use crate::server::config::CameraConfig;
use crate::stats::{CameraMetrics, CameraStats};

use super::camera::{CameraDescriptor, CameraId};
use super::entry::CameraEntry;
use super::error::RegistryError;

/// Ordered mapping of camera id to label, frame slot and capture worker
#[derive(Debug)]
pub struct CameraRegistry {
    /// Entries in configuration order
    cameras: Vec<CameraEntry>,

    /// Position of each camera in `cameras`
    index: HashMap<CameraId, usize>,

    /// Settings applied to every worker
    capture: CaptureConfig,
}

impl CameraRegistry {
    /// Create an empty registry
    pub fn new(capture: CaptureConfig) -> Self {
        Self {
            cameras: Vec::new(),
            index: HashMap::new(),
            capture,
        }
    }

    /// Build a registry from configuration, starting one worker per camera
    ///
    /// Cameras whose device fails to open are still registered; they simply
    /// never produce frames.
    pub fn from_config(
        cameras: &[CameraConfig],
        capture: CaptureConfig,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(capture);
        for camera in cameras {
            let source = camera.source.clone();
            registry.register(
                CameraDescriptor::new(camera.id, camera.label.clone()),
                move || source.open(),
            )?;
        }
        Ok(registry)
    }

    /// Register a camera and start its capture worker
    ///
    /// `open` runs on the worker thread.
    pub fn register<F>(&mut self, descriptor: CameraDescriptor, open: F) -> Result<(), RegistryError>
    where
        F: FnOnce() -> Result<Box<dyn VideoSource>, CaptureError> + Send + 'static,
    {
        let id = descriptor.id;
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateCamera(id));
        }

        let slot = Arc::new(FrameSlot::new());
        let metrics = Arc::new(CameraMetrics::new());
        let worker = CaptureWorker::new(
            descriptor.clone(),
            Arc::clone(&slot),
            Arc::clone(&metrics),
            self.capture.clone(),
        )
        .spawn(open)
        .map_err(|e| RegistryError::WorkerSpawn(id, e.to_string()))?;

        tracing::info!(camera = %id, label = %descriptor.label, "Camera registered");

        self.index.insert(id, self.cameras.len());
        self.cameras.push(CameraEntry {
            descriptor,
            slot,
            metrics,
            worker,
        });

        Ok(())
    }

    /// All cameras in configuration order
    pub fn list(&self) -> Vec<CameraDescriptor> {
        self.cameras.iter().map(|e| e.descriptor.clone()).collect()
    }

    /// Iterate over entries in configuration order
    pub fn entries(&self) -> impl Iterator<Item = &CameraEntry> {
        self.cameras.iter()
    }

    /// Look up a camera
    pub fn get(&self, id: CameraId) -> Result<&CameraEntry, RegistryError> {
        self.index
            .get(&id)
            .map(|&i| &self.cameras[i])
            .ok_or(RegistryError::CameraNotFound(id))
    }

    /// Frame slot of a camera
    pub fn slot_for(&self, id: CameraId) -> Option<Arc<FrameSlot>> {
        self.get(id).ok().map(CameraEntry::slot)
    }

    /// Check if a camera is configured
    pub fn exists(&self, id: CameraId) -> bool {
        self.index.contains_key(&id)
    }

    /// Statistics for a camera
    pub fn stats(&self, id: CameraId) -> Option<CameraStats> {
        self.get(id).ok().map(CameraEntry::stats)
    }

    /// Number of cameras
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Signal every capture worker to stop
    ///
    /// Meant for process shutdown only. Workers exit after their current
    /// cycle; slots keep their last frame.
    pub fn shutdown(&self) {
        for entry in &self.cameras {
            entry.worker.stop();
        }
        tracing::info!(cameras = self.cameras.len(), "Capture workers signalled to stop");
    }

    /// Log one line of statistics per camera
    pub fn log_stats(&self) {
        for entry in &self.cameras {
            let stats = entry.stats();
            tracing::info!(
                camera = %entry.descriptor.id,
                label = %entry.descriptor.label,
                state = %stats.state,
                frames = stats.frames_captured,
                read_failures = stats.read_failures,
                viewers = stats.viewers,
                "Camera stats"
            );
        }
    }

    /// Spawn a task logging statistics every `interval`
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn_stats_task(
        self: &Arc<Self>,
        interval: std::time::Duration,
    ) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                registry.log_stats();
            }
        })
    }
}

impl Drop for CameraRegistry {
    fn drop(&mut self) {
        for entry in &self.cameras {
            entry.worker.stop();
        }
    }
}
