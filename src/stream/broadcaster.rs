//! Per-viewer MJPEG streams
//!
//! [`StreamBroadcaster::stream`] gives every viewer its own session task that
//! samples the camera's [`FrameSlot`](crate::capture::FrameSlot) on its own
//! cadence:
//!
//! ```text
//!   FrameSlot ──snapshot──► session task ──encode──► mpsc(1) ──► MjpegStream ──► HTTP body
//!       ▲                        │
//!       └── wake on publish ─────┘  (or empty_poll_interval, whichever first)
//! ```
//!
//! The channel between the task and the body holds a single part, so a slow
//! viewer only stalls its own task. Dropping the [`MjpegStream`] aborts the
//! task; the capture worker and other viewers are unaffected.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;

use crate::capture::Frame;
use crate::error::{Error, Result};
use crate::registry::{CameraId, CameraRegistry};
use crate::session::StreamSession;

use super::encoder::{FrameEncoder, JpegEncoder};
use super::multipart;

/// Viewer stream settings
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Pause after each delivered part; bounds the per-viewer frame rate
    pub frame_interval: Duration,

    /// Longest wait for a new frame before re-checking the slot
    pub empty_poll_interval: Duration,

    /// End the stream when no new frame could be sent for this long
    /// (`None` waits forever)
    pub offline_timeout: Option<Duration>,

    /// JPEG quality for the default encoder
    pub jpeg_quality: u8,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(50),
            empty_poll_interval: Duration::from_millis(100),
            offline_timeout: Some(Duration::from_secs(30)),
            jpeg_quality: 80,
        }
    }
}

impl StreamConfig {
    /// Set the pause between delivered parts
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the empty-slot poll interval
    pub fn empty_poll_interval(mut self, interval: Duration) -> Self {
        self.empty_poll_interval = interval;
        self
    }

    /// Set or disable the offline timeout
    pub fn offline_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.offline_timeout = timeout;
        self
    }

    /// Set the JPEG quality
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }
}

/// Hands out independent MJPEG streams for registered cameras
pub struct StreamBroadcaster {
    registry: Arc<CameraRegistry>,
    encoder: Arc<dyn FrameEncoder>,
    config: StreamConfig,
    viewer_limit: Option<Arc<Semaphore>>,
    next_session_id: AtomicU64,
}

impl StreamBroadcaster {
    /// Create a broadcaster using the JPEG encoder from `config`
    pub fn new(registry: Arc<CameraRegistry>, config: StreamConfig) -> Self {
        let encoder = Arc::new(JpegEncoder::new(config.jpeg_quality));
        Self::with_encoder(registry, config, encoder)
    }

    /// Create a broadcaster with a custom encoder
    pub fn with_encoder(
        registry: Arc<CameraRegistry>,
        config: StreamConfig,
        encoder: Arc<dyn FrameEncoder>,
    ) -> Self {
        Self {
            registry,
            encoder,
            config,
            viewer_limit: None,
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Cap concurrent viewers across all cameras (0 = unlimited)
    pub fn max_viewers(mut self, max: usize) -> Self {
        self.viewer_limit = if max > 0 {
            Some(Arc::new(Semaphore::new(max)))
        } else {
            None
        };
        self
    }

    /// The camera registry streams are served from
    pub fn registry(&self) -> &Arc<CameraRegistry> {
        &self.registry
    }

    /// Get the stream configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Open a new stream for one viewer of `camera_id`
    ///
    /// Fails before anything is spawned if the camera is unknown or the
    /// viewer limit is reached. Must be called within a tokio runtime.
    pub fn stream(&self, camera_id: CameraId) -> Result<MjpegStream> {
        let entry = self.registry.get(camera_id)?;

        let permit = match self.viewer_limit {
            Some(ref limit) => match Arc::clone(limit).try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    tracing::warn!(camera = %camera_id, "Viewer rejected: limit reached");
                    return Err(Error::ViewerLimitReached(camera_id));
                }
            },
            None => None,
        };

        let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let session = StreamSession::new(session_id, camera_id, entry.metrics());
        let (tx, rx) = mpsc::channel(1);

        let pump = SessionPump {
            session,
            encoder: Arc::clone(&self.encoder),
            config: self.config.clone(),
            tx,
            _permit: permit,
        };
        let task = tokio::spawn(pump.run(entry.slot().subscribe()));

        Ok(MjpegStream {
            session_id,
            camera_id,
            rx: ReceiverStream::new(rx),
            task,
        })
    }
}

/// One viewer's stream of multipart parts
///
/// Infinite unless the camera goes offline (see
/// [`StreamConfig::offline_timeout`]). Dropping it, or calling
/// [`cancel`](MjpegStream::cancel), stops the session task.
pub struct MjpegStream {
    session_id: u64,
    camera_id: CameraId,
    rx: ReceiverStream<Bytes>,
    task: JoinHandle<()>,
}

impl MjpegStream {
    /// Session ID of this viewer
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Camera being streamed
    pub fn camera_id(&self) -> CameraId {
        self.camera_id
    }

    /// Stop streaming and release the session
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl Stream for MjpegStream {
    type Item = std::result::Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx).map(|part| part.map(Ok))
    }
}

impl Drop for MjpegStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for MjpegStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MjpegStream")
            .field("session_id", &self.session_id)
            .field("camera_id", &self.camera_id)
            .finish()
    }
}

/// Session task state
struct SessionPump {
    session: StreamSession,
    encoder: Arc<dyn FrameEncoder>,
    config: StreamConfig,
    tx: mpsc::Sender<Bytes>,
    _permit: Option<OwnedSemaphorePermit>,
}

impl SessionPump {
    /// Serve frames until the viewer goes away, the camera is offline or
    /// every sender of `updates` is dropped
    async fn run(mut self, mut updates: watch::Receiver<Option<Frame>>) {
        let camera = self.session.camera_id;

        loop {
            let Some(frame) = self.next_frame(&mut updates).await else {
                break;
            };

            let encoder = Arc::clone(&self.encoder);
            let source = frame.clone();
            let jpeg = match tokio::task::spawn_blocking(move || encoder.encode(source.image())).await
            {
                Ok(Ok(jpeg)) => jpeg,
                Ok(Err(e)) => {
                    tracing::warn!(
                        session_id = self.session.id,
                        camera = %camera,
                        seq = frame.seq(),
                        error = %e,
                        "Skipping frame"
                    );
                    self.session.on_encode_failure(frame.seq());
                    tokio::time::sleep(self.config.frame_interval).await;
                    continue;
                }
                Err(e) => {
                    tracing::error!(session_id = self.session.id, error = %e, "Encoder task failed");
                    break;
                }
            };

            let part = multipart::encode_part(&jpeg);
            let len = part.len();
            if self.tx.send(part).await.is_err() {
                tracing::debug!(session_id = self.session.id, "Viewer stream dropped");
                break;
            }
            self.session.on_sent(frame.seq(), len);

            tokio::time::sleep(self.config.frame_interval).await;
        }
    }

    /// Wait for a frame this viewer has not been sent yet
    ///
    /// Returns `None` when the camera is considered offline or the slot is
    /// gone.
    async fn next_frame(&mut self, updates: &mut watch::Receiver<Option<Frame>>) -> Option<Frame> {
        loop {
            let current = updates.borrow_and_update().clone();
            match current {
                Some(frame) if !self.session.already_sent(frame.seq()) => return Some(frame),
                _ => {}
            }

            if let Some(limit) = self.config.offline_timeout {
                if self.session.idle_for() >= limit {
                    tracing::warn!(
                        session_id = self.session.id,
                        camera = %self.session.camera_id,
                        waited_ms = limit.as_millis() as u64,
                        "No new frames, closing stream (camera offline)"
                    );
                    return None;
                }
            }

            match tokio::time::timeout(self.config.empty_poll_interval, updates.changed()).await {
                Ok(Err(_)) => {
                    tracing::debug!(session_id = self.session.id, "Frame slot closed");
                    return None;
                }
                Ok(Ok(())) | Err(_) => {}
            }
        }
    }
}
