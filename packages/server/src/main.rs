use std::sync::Arc;

use common::storage::filesystem::FilesystemBlobStore;
use tracing::{Level, info};

use rush_server::config::AppConfig;
use rush_server::database::init_db;
use rush_server::state::AppState;
use rush_server::utils::calendar::SystemClock;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;
    let db = init_db(&config.database).await?;
    info!("Database ready");

    let max_blob_size = config.media.max_video_size.max(config.media.max_image_size);
    let blob_store =
        FilesystemBlobStore::new(config.media.storage_dir.clone(), max_blob_size).await?;
    info!(dir = %config.media.storage_dir.display(), "Media store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        blob_store: Arc::new(blob_store),
        clock: Arc::new(SystemClock),
    };

    let app = rush_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
