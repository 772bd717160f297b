//! NVR server listener
//!
//! Binds the HTTP listener and serves the router until shutdown.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::registry::CameraRegistry;
use crate::server::config::ServerConfig;
use crate::server::routes::{self, AppState};
use crate::stream::StreamBroadcaster;

/// NVR HTTP server
pub struct NvrServer {
    config: ServerConfig,
    registry: Arc<CameraRegistry>,
    broadcaster: Arc<StreamBroadcaster>,
}

impl NvrServer {
    /// Create a server, starting one capture worker per configured camera
    pub fn new(config: ServerConfig) -> Result<Self> {
        let registry = CameraRegistry::from_config(&config.cameras, config.capture.clone())?;
        Ok(Self::with_registry(config, Arc::new(registry)))
    }

    /// Create a server around an existing registry
    ///
    /// `config.cameras` is ignored.
    pub fn with_registry(config: ServerConfig, registry: Arc<CameraRegistry>) -> Self {
        let broadcaster = StreamBroadcaster::new(Arc::clone(&registry), config.stream.clone())
            .max_viewers(config.max_viewers);

        Self {
            config,
            registry,
            broadcaster: Arc::new(broadcaster),
        }
    }

    /// Get a reference to the camera registry
    pub fn registry(&self) -> &Arc<CameraRegistry> {
        &self.registry
    }

    /// Get a reference to the stream broadcaster
    pub fn broadcaster(&self) -> &Arc<StreamBroadcaster> {
        &self.broadcaster
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Router serving the dashboard and the feeds
    pub fn router(&self) -> Router {
        routes::router(AppState {
            broadcaster: Arc::clone(&self.broadcaster),
        })
    }

    /// Run the server
    ///
    /// This method blocks until the listener fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` completes
    ///
    /// MJPEG responses never finish on their own, so shutdown does not wait
    /// for open connections. Capture workers are stopped on return.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, cameras = self.registry.len(), "NVR server listening");

        let stats_handle = self.registry.spawn_stats_task(self.config.stats_interval);
        let router = self.router();

        let result: Result<()> = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = async move { axum::serve(listener, router).await } => {
                result.map_err(Into::into)
            }
        };

        stats_handle.abort();
        self.registry.shutdown();

        result
    }
}
