//! Album store boundary
//!
//! The store is an opaque collection of albums addressed by store-assigned
//! ids. Each batch call is a single commit; nothing ties two calls together.

use async_trait::async_trait;

use crate::album::{Album, AlbumRecord};
use crate::Result;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryAlbumStore;
pub use sqlite::{init_database, SqliteAlbumStore};

/// Operations the gallery needs from its backing store
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Full current collection, in insertion order
    async fn list(&self) -> Result<Vec<Album>>;

    /// Insert one album and return it with its new id
    async fn add(&self, record: AlbumRecord) -> Result<Album>;

    /// Replace every field of an existing album
    ///
    /// Fails with [`crate::Error::NotFound`] if the id does not exist.
    async fn update(&self, id: &str, record: AlbumRecord) -> Result<()>;

    /// Delete one album
    ///
    /// Fails with [`crate::Error::NotFound`] if the id does not exist.
    async fn remove(&self, id: &str) -> Result<()>;

    /// Delete a batch of albums in one commit; unknown ids are ignored
    async fn delete_batch(&self, ids: &[String]) -> Result<usize>;

    /// Insert a batch of albums in one commit, assigning fresh ids
    async fn insert_batch(&self, records: &[AlbumRecord]) -> Result<usize>;
}
