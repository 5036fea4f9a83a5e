//! SQLite-backed album store

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::AlbumStore;
use crate::album::{Album, AlbumRecord};
use crate::{Error, Result};

const SELECT_COLUMNS: &str = "id, name, category, participants, start_date, end_date, link, \
                              thumbnail, video_link1, video_link2, video_link3";

/// Open (creating if needed) the gallery database and its schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets readers continue while a bulk replace is writing
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_albums_table(&pool).await?;

    Ok(pool)
}

async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            participants TEXT NOT NULL DEFAULT '',
            start_date TEXT,
            end_date TEXT,
            link TEXT,
            thumbnail TEXT,
            video_link1 TEXT,
            video_link2 TEXT,
            video_link3 TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn album_from_row(row: &SqliteRow) -> Result<Album> {
    Ok(Album::new(
        row.try_get::<String, _>("id")?,
        AlbumRecord {
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            participants: row.try_get("participants")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            link: row.try_get("link")?,
            thumbnail: row.try_get("thumbnail")?,
            video_link1: row.try_get("video_link1")?,
            video_link2: row.try_get("video_link2")?,
            video_link3: row.try_get("video_link3")?,
        },
    ))
}

/// Album store over a SQLite pool
#[derive(Clone)]
pub struct SqliteAlbumStore {
    pool: SqlitePool,
}

impl SqliteAlbumStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn insert_one<'e, E>(executor: E, record: &AlbumRecord) -> Result<String>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO albums (id, name, category, participants, start_date, end_date, link,
                                 thumbnail, video_link1, video_link2, video_link3)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&record.name)
        .bind(&record.category)
        .bind(&record.participants)
        .bind(&record.start_date)
        .bind(&record.end_date)
        .bind(&record.link)
        .bind(&record.thumbnail)
        .bind(&record.video_link1)
        .bind(&record.video_link2)
        .bind(&record.video_link3)
        .execute(executor)
        .await?;
        Ok(id)
    }
}

#[async_trait]
impl AlbumStore for SqliteAlbumStore {
    async fn list(&self) -> Result<Vec<Album>> {
        let sql = format!("SELECT {} FROM albums ORDER BY created_at ASC, rowid ASC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(album_from_row).collect()
    }

    async fn add(&self, record: AlbumRecord) -> Result<Album> {
        let id = Self::insert_one(&self.pool, &record).await?;
        Ok(Album::new(id, record))
    }

    async fn update(&self, id: &str, record: AlbumRecord) -> Result<()> {
        let result = sqlx::query(
            "UPDATE albums
             SET name = ?, category = ?, participants = ?, start_date = ?, end_date = ?,
                 link = ?, thumbnail = ?, video_link1 = ?, video_link2 = ?, video_link3 = ?,
                 updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
        )
        .bind(&record.name)
        .bind(&record.category)
        .bind(&record.participants)
        .bind(&record.start_date)
        .bind(&record.end_date)
        .bind(&record.link)
        .bind(&record.thumbnail)
        .bind(&record.video_link1)
        .bind(&record.video_link2)
        .bind(&record.video_link3)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("album {}", id)));
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("album {}", id)));
        }
        Ok(())
    }

    async fn delete_batch(&self, ids: &[String]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;
        for id in ids {
            let result = sqlx::query("DELETE FROM albums WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            deleted += result.rows_affected() as usize;
        }
        tx.commit().await?;
        Ok(deleted)
    }

    async fn insert_batch(&self, records: &[AlbumRecord]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            Self::insert_one(&mut *tx, record).await?;
        }
        tx.commit().await?;
        Ok(records.len())
    }
}
