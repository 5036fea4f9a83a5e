//! tfg-gallery - password-gated photo and video album gallery
//!
//! Serves the gallery UI and its API on a single port, backed by a SQLite
//! album store in the root folder.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tfg_common::config::GalleryConfig;
use tfg_common::store::{init_database, SqliteAlbumStore};
use tfg_common::AlbumSync;
use tfg_gallery::cli::{init_tracing, load_file_config, Args};
use tfg_gallery::server::{serve_until, stop_requested};
use tfg_gallery::{build_router, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Build identification first, before any slow startup work
    info!(
        "Starting Teafriends gallery (tfg-gallery) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let file_config = load_file_config(args.config.as_ref()).context("Failed to load config file")?;
    let config = GalleryConfig::resolve(&args.overrides(), &file_config)
        .context("Invalid configuration")?;

    info!("Database path: {}", config.store.database_path.display());
    let pool = match init_database(&config.store.database_path).await {
        Ok(pool) => {
            info!("✓ Album database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open album database: {}", e);
            return Err(e.into());
        }
    };

    let store = Arc::new(SqliteAlbumStore::new(pool));
    let sync = Arc::new(AlbumSync::new(store, config.batch_limit));
    match sync.refresh().await {
        Ok(albums) if albums.is_empty() => info!("Album store is empty, showing seed data"),
        Ok(albums) => info!("Loaded {} albums", albums.len()),
        Err(e) => error!("Initial album read failed, showing seed data: {}", e),
    }

    let state = AppState::new(sync, config.secrets.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    info!("tfg-gallery listening on http://{}", config.bind);
    info!("Health check: http://{}/health", config.bind);

    serve_until(listener, app, stop_requested())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}
