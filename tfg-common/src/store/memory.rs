//! In-memory album store
//!
//! Stands in for the real store in tests and local demos. Failures can be
//! injected per operation kind to exercise the partial-failure paths of a
//! bulk replace.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AlbumStore;
use crate::album::{Album, AlbumRecord};
use crate::{Error, Result};

/// Injectable failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail with a generic internal error
    Broken,
    /// Fail as a rejected write
    PermissionDenied,
}

impl Fault {
    fn into_error(self, operation: &str) -> Error {
        match self {
            Fault::Broken => Error::Internal(format!("injected failure in {}", operation)),
            Fault::PermissionDenied => {
                Error::PermissionDenied(format!("injected denial in {}", operation))
            }
        }
    }
}

#[derive(Default)]
struct Faults {
    list: Option<Fault>,
    delete: Option<Fault>,
    single_write: Option<Fault>,
    /// Insert batches allowed to succeed before `insert` starts failing
    insert_after: Option<(usize, Fault)>,
}

#[derive(Default)]
pub struct MemoryAlbumStore {
    albums: RwLock<Vec<Album>>,
    faults: RwLock<Faults>,
    insert_batches: AtomicUsize,
    delete_batches: AtomicUsize,
}

impl MemoryAlbumStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with albums (ids kept as given)
    pub fn with_albums(albums: Vec<Album>) -> Self {
        Self {
            albums: RwLock::new(albums),
            ..Self::default()
        }
    }

    pub async fn fail_list(&self, fault: Option<Fault>) {
        self.faults.write().await.list = fault;
    }

    pub async fn fail_deletes(&self, fault: Option<Fault>) {
        self.faults.write().await.delete = fault;
    }

    pub async fn fail_single_writes(&self, fault: Option<Fault>) {
        self.faults.write().await.single_write = fault;
    }

    /// Let `ok_batches` insert batches commit, then fail every later one
    pub async fn fail_inserts_after(&self, ok_batches: usize, fault: Fault) {
        self.insert_batches.store(0, Ordering::SeqCst);
        self.faults.write().await.insert_after = Some((ok_batches, fault));
    }

    /// Number of insert batches committed so far
    pub fn insert_batch_count(&self) -> usize {
        self.insert_batches.load(Ordering::SeqCst)
    }

    /// Number of delete batch calls received so far (failed ones included)
    pub fn delete_batch_count(&self) -> usize {
        self.delete_batches.load(Ordering::SeqCst)
    }

    async fn check_single_write(&self, operation: &str) -> Result<()> {
        match self.faults.read().await.single_write {
            Some(fault) => Err(fault.into_error(operation)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AlbumStore for MemoryAlbumStore {
    async fn list(&self) -> Result<Vec<Album>> {
        if let Some(fault) = self.faults.read().await.list {
            return Err(fault.into_error("list"));
        }
        Ok(self.albums.read().await.clone())
    }

    async fn add(&self, record: AlbumRecord) -> Result<Album> {
        self.check_single_write("add").await?;
        let album = Album::new(Uuid::new_v4().to_string(), record);
        self.albums.write().await.push(album.clone());
        Ok(album)
    }

    async fn update(&self, id: &str, record: AlbumRecord) -> Result<()> {
        self.check_single_write("update").await?;
        let mut albums = self.albums.write().await;
        let album = albums
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(format!("album {}", id)))?;
        album.record = record;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.check_single_write("remove").await?;
        let mut albums = self.albums.write().await;
        let before = albums.len();
        albums.retain(|a| a.id != id);
        if albums.len() == before {
            return Err(Error::NotFound(format!("album {}", id)));
        }
        Ok(())
    }

    async fn delete_batch(&self, ids: &[String]) -> Result<usize> {
        self.delete_batches.fetch_add(1, Ordering::SeqCst);
        if let Some(fault) = self.faults.read().await.delete {
            return Err(fault.into_error("delete_batch"));
        }
        let mut albums = self.albums.write().await;
        let before = albums.len();
        albums.retain(|a| !ids.contains(&a.id));
        Ok(before - albums.len())
    }

    async fn insert_batch(&self, records: &[AlbumRecord]) -> Result<usize> {
        if let Some((ok_batches, fault)) = self.faults.read().await.insert_after {
            if self.insert_batches.load(Ordering::SeqCst) >= ok_batches {
                return Err(fault.into_error("insert_batch"));
            }
        }
        let mut albums = self.albums.write().await;
        albums.extend(
            records
                .iter()
                .cloned()
                .map(|record| Album::new(Uuid::new_v4().to_string(), record)),
        );
        self.insert_batches.fetch_add(1, Ordering::SeqCst);
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> AlbumRecord {
        AlbumRecord {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_update_remove() {
        let store = MemoryAlbumStore::new();
        let album = store.add(record("a")).await.unwrap();

        store.update(&album.id, record("b")).await.unwrap();
        assert_eq!(store.list().await.unwrap()[0].record.name, "b");

        store.remove(&album.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(store.remove(&album.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_insert_fault_after_batches() {
        let store = MemoryAlbumStore::new();
        store.fail_inserts_after(1, Fault::Broken).await;

        assert_eq!(store.insert_batch(&[record("a")]).await.unwrap(), 1);
        assert!(store.insert_batch(&[record("b")]).await.is_err());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_write_denial() {
        let store = MemoryAlbumStore::new();
        store.fail_single_writes(Some(Fault::PermissionDenied)).await;
        let err = store.add(record("a")).await.unwrap_err();
        assert!(err.is_permission_denied());
    }
}
