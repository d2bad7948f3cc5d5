//! Label-scan gateway server: OCR/QR photo intake relayed to GLPI.

use scan_api::server::{self, AppState};
use scan_glpi::GlpiClient;
use scan_pipeline::AssetPipeline;
use scan_types::AssetInventory;
use scan_vision::{ImageQrDecoder, TesseractOcr};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let inventory: Option<Arc<dyn AssetInventory>> = match GlpiClient::from_env() {
        Some(client) => Some(Arc::new(client)),
        None => {
            tracing::warn!("GLPI env not configured; inventory relay disabled");
            None
        }
    };
    let pipeline = AssetPipeline::new(
        Arc::new(TesseractOcr::from_env()),
        Arc::new(ImageQrDecoder::new()),
        inventory,
    );

    let app = server::router(Arc::new(AppState { pipeline }));
    let addr: SocketAddr = std::env::var("GATEWAY_LISTEN")
        .unwrap_or_else(|_| "0.0.0.0:8001".to_string())
        .parse()?;
    tracing::info!("scan gateway listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
