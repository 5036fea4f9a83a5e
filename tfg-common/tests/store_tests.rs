//! Integration tests for the SQLite album store
//!
//! Each test works on its own throwaway database file.

use tempfile::TempDir;
use tfg_common::store::{init_database, AlbumStore, SqliteAlbumStore};
use tfg_common::{AlbumRecord, Error};

async fn setup_store() -> (TempDir, SqliteAlbumStore) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let db_path = dir.path().join("nested").join("gallery.db");
    let pool = init_database(&db_path)
        .await
        .expect("Should initialize database");
    assert!(db_path.exists(), "Database file was not created");
    (dir, SqliteAlbumStore::new(pool))
}

fn record(name: &str, start: &str) -> AlbumRecord {
    AlbumRecord {
        name: name.to_string(),
        category: "國內旅遊, 爬山".to_string(),
        participants: "羅家1人".to_string(),
        start_date: Some(start.to_string()),
        thumbnail: Some("https://img/1.jpg".to_string()),
        video_link3: Some("https://youtu.be/3".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_init_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gallery.db");

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_add_then_list_round_trips_all_fields() {
    let (_dir, store) = setup_store().await;

    let added = store.add(record("柴山", "2024/03/02")).await.unwrap();
    assert!(!added.id.is_empty());

    let albums = store.list().await.unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0], added);
    assert_eq!(albums[0].record.video_link3.as_deref(), Some("https://youtu.be/3"));
    assert_eq!(albums[0].record.video_link1, None);
}

#[tokio::test]
async fn test_list_keeps_insertion_order() {
    let (_dir, store) = setup_store().await;
    let records: Vec<_> = (0..5).map(|i| record(&format!("album {}", i), "2024/01/01")).collect();
    assert_eq!(store.insert_batch(&records).await.unwrap(), 5);

    let names: Vec<_> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.record.name)
        .collect();
    assert_eq!(names, vec!["album 0", "album 1", "album 2", "album 3", "album 4"]);
}

#[tokio::test]
async fn test_update_and_remove_missing_id() {
    let (_dir, store) = setup_store().await;

    let err = store.update("missing", record("x", "")).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    let err = store.remove("missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_update_overwrites_every_field() {
    let (_dir, store) = setup_store().await;
    let added = store.add(record("before", "2024/01/01")).await.unwrap();

    let replacement = AlbumRecord {
        name: "after".to_string(),
        category: "單車".to_string(),
        ..Default::default()
    };
    store.update(&added.id, replacement.clone()).await.unwrap();

    let albums = store.list().await.unwrap();
    assert_eq!(albums[0].id, added.id);
    assert_eq!(albums[0].record, replacement);
}

#[tokio::test]
async fn test_delete_batch_ignores_unknown_ids() {
    let (_dir, store) = setup_store().await;
    let a = store.add(record("a", "2024/01/01")).await.unwrap();
    let b = store.add(record("b", "2024/01/02")).await.unwrap();

    let deleted = store
        .delete_batch(&[a.id.clone(), "nope".to_string()])
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let albums = store.list().await.unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0].id, b.id);
}

#[tokio::test]
async fn test_read_only_database_reports_permission_denied() {
    let (dir, store) = setup_store().await;
    store.add(record("a", "2024/01/01")).await.unwrap();
    store.pool().close().await;

    let db_path = dir.path().join("nested").join("gallery.db");
    let url = format!("sqlite://{}?mode=ro&immutable=1", db_path.display());
    let pool = sqlx::SqlitePool::connect(&url).await.unwrap();
    let read_only = SqliteAlbumStore::new(pool);

    assert_eq!(read_only.list().await.unwrap().len(), 1);
    let err = read_only.add(record("b", "2024/01/02")).await.unwrap_err();
    assert!(err.is_permission_denied(), "Expected permission denied, got {:?}", err);
}
