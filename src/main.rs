use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::config::RestConfig;
use api_rest::AppState;
use carepoint_files::CloudinaryStore;

/// Main entry point for the Carepoint application
///
/// Loads `.env`, resolves the REST configuration once, wires the Cloudinary media store into the
/// application state and serves the REST API until the process is stopped.
///
/// # Environment Variables
/// - `CARE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `DATA_DIR`: Directory for user and record documents (default: "carepoint_data")
/// - `AUDIO_DIR`: Directory symptom recordings are written to (default: "../audio/")
/// - `UPLOAD_FOLDER`: Media store folder for profile images (default: "gemini-folder")
/// - `CLOUD_NAME`, `CLOUD_API_KEY`, `CLOUD_API_SECRET`: media store credentials (required)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server loop fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carepoint=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = RestConfig::from_env()?;
    let media_store = Arc::new(CloudinaryStore::new(cfg.media_store.clone())?);
    let state = AppState::from_config(&cfg, media_store)?;

    tracing::info!("++ Starting Carepoint REST on {}", cfg.addr);

    let listener = tokio::net::TcpListener::bind(&cfg.addr).await?;
    axum::serve(listener, api_rest::router(state)).await?;

    Ok(())
}
