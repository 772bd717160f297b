use std::net::SocketAddr;

use mjpeg_nvr::{NvrServer, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mjpeg_nvr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting mjpeg-nvr v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> mjpeg_nvr::error::Result<()> {
    let mut config = ServerConfig::from_env()?;

    if let Some(arg) = std::env::args().nth(1) {
        let addr: SocketAddr = arg
            .parse()
            .map_err(|e| mjpeg_nvr::error::Error::Config(format!("bind address '{}': {}", arg, e)))?;
        config = config.bind(addr);
    }

    for camera in &config.cameras {
        tracing::info!(camera = %camera.id, label = %camera.label, source = %camera.source, "Configured camera");
    }

    let server = NvrServer::new(config)?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
}
