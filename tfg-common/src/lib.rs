//! # Teafriends Gallery Common Library
//!
//! Shared code for the gallery service and its tools:
//! - Album model, seed data and CSV import/export
//! - Filter/sort engine and category extraction
//! - Album store boundary (SQLite and in-memory)
//! - Sync adapter publishing full-list snapshots
//! - Password gates, configuration and backups

pub mod album;
pub mod backup;
pub mod config;
pub mod csv_import;
pub mod error;
pub mod events;
pub mod gallery;
pub mod gate;
pub mod seed;
pub mod store;
pub mod sync;

pub use album::{Album, AlbumRecord};
pub use error::{Error, ReplaceError, Result};
pub use sync::AlbumSync;
