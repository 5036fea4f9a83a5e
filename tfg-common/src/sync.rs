//! Sync adapter between the album store and everything that displays it
//!
//! The store is the only source of truth. Writes go straight to the store;
//! afterwards the full list is re-read and published as a snapshot, and
//! readers re-render from that echo. No local state is patched optimistically.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::album::{Album, AlbumRecord};
use crate::error::ReplaceError;
use crate::events::{EventBus, GalleryEvent, ReplaceProgress, ReplaceStage};
use crate::store::AlbumStore;
use crate::{Error, Result};

/// Largest number of operations committed together
pub const MAX_BATCH_LIMIT: usize = 500;

/// Event bus capacity; snapshots are large, so keep the backlog short
const EVENT_CAPACITY: usize = 64;

/// Outcome of a bulk replace whose insert phase completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceReport {
    pub deleted: usize,
    pub inserted: usize,
    /// Set when the delete phase failed and was skipped over
    pub delete_phase_error: Option<String>,
}

pub struct AlbumSync {
    store: Arc<dyn AlbumStore>,
    bus: EventBus,
    batch_limit: usize,
    latest: RwLock<Option<Arc<Vec<Album>>>>,
    /// Held from the store read until the snapshot is cached and published
    publish_lock: Mutex<()>,
    progress: RwLock<Option<ReplaceProgress>>,
}

impl AlbumSync {
    /// `batch_limit` is clamped to `1..=MAX_BATCH_LIMIT`
    pub fn new(store: Arc<dyn AlbumStore>, batch_limit: usize) -> Self {
        Self {
            store,
            bus: EventBus::new(EVENT_CAPACITY),
            batch_limit: batch_limit.clamp(1, MAX_BATCH_LIMIT),
            latest: RwLock::new(None),
            publish_lock: Mutex::new(()),
            progress: RwLock::new(None),
        }
    }

    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Re-read the full list from the store and publish it
    ///
    /// Refreshes are serialized, so a slow read can never publish over a
    /// newer one.
    pub async fn refresh(&self) -> Result<Arc<Vec<Album>>> {
        let _publishing = self.publish_lock.lock().await;
        let albums = Arc::new(self.store.list().await?);
        *self.latest.write().await = Some(albums.clone());
        debug!("Publishing snapshot of {} albums", albums.len());
        self.bus.emit_lossy(GalleryEvent::albums_changed(albums.clone()));
        Ok(albums)
    }

    /// Latest snapshot, reading the store if none has been taken yet
    ///
    /// A first read is cached but not published: nothing changed.
    pub async fn snapshot(&self) -> Result<Arc<Vec<Album>>> {
        if let Some(albums) = self.latest.read().await.as_ref() {
            return Ok(albums.clone());
        }
        let _publishing = self.publish_lock.lock().await;
        if let Some(albums) = self.latest.read().await.as_ref() {
            return Ok(albums.clone());
        }
        let albums = Arc::new(self.store.list().await?);
        *self.latest.write().await = Some(albums.clone());
        Ok(albums)
    }

    /// Snapshot for display; a read failure yields an empty list
    ///
    /// Callers substitute seed data for an empty list, so an unreachable
    /// store degrades to the seed gallery instead of an error page.
    pub async fn albums_for_display(&self) -> Arc<Vec<Album>> {
        match self.snapshot().await {
            Ok(albums) => albums,
            Err(e) => {
                warn!("Failed to read albums, falling back to seed data: {}", e);
                Arc::new(Vec::new())
            }
        }
    }

    /// Subscribe to full-list snapshots and replace progress
    pub async fn subscribe(&self) -> SnapshotSubscription {
        // Subscribe before reading so no change can slip in between
        let rx = self.bus.subscribe();
        let initial = self.albums_for_display().await;
        SnapshotSubscription {
            initial: Some(initial),
            rx,
        }
    }

    pub async fn latest_progress(&self) -> Option<ReplaceProgress> {
        self.progress.read().await.clone()
    }

    async fn publish_after_write(&self) {
        if let Err(e) = self.refresh().await {
            warn!("Write succeeded but refreshing the snapshot failed: {}", e);
        }
    }

    async fn report_progress(&self, progress: ReplaceProgress) {
        debug!("Replace progress: {}", progress.message);
        *self.progress.write().await = Some(progress.clone());
        self.bus.emit_lossy(GalleryEvent::replace_progress(progress));
    }

    /// Add one album
    pub async fn add(&self, record: AlbumRecord) -> Result<Album> {
        if record.name.trim().is_empty() {
            return Err(Error::InvalidInput("album name must not be empty".to_string()));
        }
        let album = self.store.add(record).await.inspect_err(|e| {
            error!("Failed to add album: {}", e);
        })?;
        info!("Added album {} ({})", album.id, album.record.name);
        self.publish_after_write().await;
        Ok(album)
    }

    /// Overwrite one album
    pub async fn update(&self, id: &str, record: AlbumRecord) -> Result<()> {
        if record.name.trim().is_empty() {
            return Err(Error::InvalidInput("album name must not be empty".to_string()));
        }
        self.store.update(id, record).await.inspect_err(|e| {
            error!("Failed to update album {}: {}", id, e);
        })?;
        info!("Updated album {}", id);
        self.publish_after_write().await;
        Ok(())
    }

    /// Delete one album
    pub async fn remove(&self, id: &str) -> Result<()> {
        self.store.remove(id).await.inspect_err(|e| {
            error!("Failed to remove album {}: {}", id, e);
        })?;
        info!("Removed album {}", id);
        self.publish_after_write().await;
        Ok(())
    }

    /// Replace the whole collection: delete everything, then insert `records`
    ///
    /// Best effort, not transactional. A failing delete phase is logged,
    /// reported in [`ReplaceReport::delete_phase_error`] and the insert phase
    /// runs anyway. A failing insert batch stops the replace and leaves the
    /// batches already committed in place. An empty `records` still clears
    /// the collection.
    pub async fn replace_all(
        &self,
        records: Vec<AlbumRecord>,
    ) -> std::result::Result<ReplaceReport, ReplaceError> {
        let (deleted, delete_phase_error) = match self.delete_everything().await {
            Ok(deleted) => (deleted, None),
            Err((deleted, e)) => {
                warn!(
                    "Delete phase failed after {} albums, inserting anyway: {}",
                    deleted, e
                );
                (deleted, Some(e.to_string()))
            }
        };

        let total = records.len();
        let mut inserted = 0;
        self.report_progress(ReplaceProgress::new(ReplaceStage::Inserting, 0, total))
            .await;

        for chunk in records.chunks(self.batch_limit) {
            match self.store.insert_batch(chunk).await {
                Ok(n) => {
                    inserted += n;
                    self.report_progress(ReplaceProgress::new(
                        ReplaceStage::Inserting,
                        inserted,
                        total,
                    ))
                    .await;
                }
                Err(source) => {
                    error!(
                        "Insert phase failed after {} of {} albums: {}",
                        inserted, total, source
                    );
                    self.report_progress(ReplaceProgress::new(
                        ReplaceStage::Failed,
                        inserted,
                        total,
                    ))
                    .await;
                    self.publish_after_write().await;
                    return Err(ReplaceError {
                        inserted,
                        total,
                        delete_phase_error,
                        source,
                    });
                }
            }
        }

        info!("Replaced album collection: {} deleted, {} inserted", deleted, inserted);
        self.report_progress(ReplaceProgress::new(ReplaceStage::Finished, inserted, total))
            .await;
        self.publish_after_write().await;

        Ok(ReplaceReport {
            deleted,
            inserted,
            delete_phase_error,
        })
    }

    /// Returns the number deleted, or the number deleted before the failure
    async fn delete_everything(&self) -> std::result::Result<usize, (usize, Error)> {
        let ids: Vec<String> = self
            .store
            .list()
            .await
            .map_err(|e| (0, e))?
            .into_iter()
            .map(|album| album.id)
            .collect();

        let total = ids.len();
        let mut deleted = 0;
        self.report_progress(ReplaceProgress::new(ReplaceStage::Deleting, 0, total))
            .await;

        for chunk in ids.chunks(self.batch_limit) {
            self.store
                .delete_batch(chunk)
                .await
                .map_err(|e| (deleted, e))?;
            deleted += chunk.len();
            self.report_progress(ReplaceProgress::new(ReplaceStage::Deleting, deleted, total))
                .await;
        }
        Ok(deleted)
    }
}

/// Live feed of snapshots for one reader
///
/// Yields the snapshot current at subscription time first, then every later
/// event. Dropping it unsubscribes.
pub struct SnapshotSubscription {
    initial: Option<Arc<Vec<Album>>>,
    rx: broadcast::Receiver<GalleryEvent>,
}

impl SnapshotSubscription {
    /// Next event, or `None` once the bus is gone
    pub async fn next(&mut self) -> Option<GalleryEvent> {
        if let Some(albums) = self.initial.take() {
            return Some(GalleryEvent::albums_changed(albums));
        }
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // a newer snapshot is still queued behind the gap
                    warn!("Snapshot subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
