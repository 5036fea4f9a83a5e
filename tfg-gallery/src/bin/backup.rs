//! tfg-backup - dump every album to a timestamped JSON file
//!
//! Exits 0 after writing the file, 1 on any failure.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use tfg_common::backup::write_backup;
use tfg_common::config::StoreConfig;
use tfg_common::store::{init_database, AlbumStore, SqliteAlbumStore};
use tfg_gallery::cli::{init_tracing, load_file_config, BackupArgs};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = BackupArgs::parse();

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Backup failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &BackupArgs) -> Result<()> {
    let file_config = load_file_config(args.config.as_ref()).context("Failed to load config file")?;
    let config = StoreConfig::resolve(&args.overrides(), &file_config);

    if !config.database_path.exists() {
        bail!("No album database at {}", config.database_path.display());
    }
    info!("Reading albums from {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open album database")?;
    let store = SqliteAlbumStore::new(pool);
    let albums = store.list().await.context("Failed to read albums")?;

    let path = write_backup(&albums, &config.backup_dir, Utc::now())
        .context("Failed to write backup file")?;
    info!("Backup complete: {} albums written to {}", albums.len(), path.display());
    Ok(())
}
