//! Per-viewer session state
//!
//! Tracks which camera a viewer watches, the identity of the last frame it was
//! sent, and what it has been sent so far. Creating a session counts the
//! viewer against its camera; dropping it, however the stream ends, uncounts
//! it.

use std::sync::Arc;
use std::time::Instant;

use crate::registry::CameraId;
use crate::stats::{CameraMetrics, SessionStats};

/// Ephemeral state of one viewer connection
#[derive(Debug)]
pub struct StreamSession {
    /// Unique session ID
    pub id: u64,

    /// Camera being watched
    pub camera_id: CameraId,

    /// When the viewer connected
    pub started_at: Instant,

    /// Sequence number of the last frame sent
    last_seq: Option<u64>,

    /// When the last new frame was sent
    last_sent_at: Option<Instant>,

    /// Delivery counters
    stats: SessionStats,

    metrics: Arc<CameraMetrics>,
}

impl StreamSession {
    /// Open a session and count the viewer
    pub fn new(id: u64, camera_id: CameraId, metrics: Arc<CameraMetrics>) -> Self {
        let viewers = metrics.viewer_joined();
        tracing::info!(session_id = id, camera = %camera_id, viewers, "Viewer connected");

        Self {
            id,
            camera_id,
            started_at: Instant::now(),
            last_seq: None,
            last_sent_at: None,
            stats: SessionStats::new(),
            metrics,
        }
    }

    /// Whether the frame with this sequence number was already sent
    pub fn already_sent(&self, seq: u64) -> bool {
        self.last_seq == Some(seq)
    }

    /// Sequence number of the last frame sent
    pub fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }

    /// Record a delivered part
    pub fn on_sent(&mut self, seq: u64, bytes: usize) {
        self.last_seq = Some(seq);
        self.last_sent_at = Some(Instant::now());
        self.stats.chunks_sent += 1;
        self.stats.bytes_sent += bytes as u64;
    }

    /// Record a frame that could not be encoded; it is not retried
    pub fn on_encode_failure(&mut self, seq: u64) {
        self.last_seq = Some(seq);
        self.stats.encode_failures += 1;
    }

    /// Time since the last new frame was sent, or since connect if none was
    pub fn idle_for(&self) -> std::time::Duration {
        self.last_sent_at.unwrap_or(self.started_at).elapsed()
    }

    /// Session statistics
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            duration: self.started_at.elapsed(),
            ..self.stats.clone()
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        let viewers = self.metrics.viewer_left();
        let stats = self.stats();
        tracing::info!(
            session_id = self.id,
            camera = %self.camera_id,
            viewers,
            chunks = stats.chunks_sent,
            bytes = stats.bytes_sent,
            fps = stats.frame_rate(),
            bitrate_bps = stats.bitrate(),
            duration_ms = stats.duration.as_millis() as u64,
            "Viewer disconnected"
        );
    }
}
