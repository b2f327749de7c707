use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;
use tokio::fs;

use crate::engine::error::StoreError;
use crate::engine::store::StorageBackend;

/// Records kept in a single SQLite table, one row per user.
pub struct SqliteBackend {
    pub pool: Pool<Sqlite>,
}

impl SqliteBackend {
    /// Opens (creating if needed) the database file at `db_path`.
    pub async fn open(db_path: &str) -> Result<Self, StoreError> {
        if !Path::new(db_path).exists() {
            fs::File::create(db_path).await?;
        }
        Self::connect(&format!("sqlite://{}", db_path), 5).await
    }

    /// Connects to any sqlite URL, e.g. `sqlite::memory:`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_records (
                user_id TEXT PRIMARY KEY NOT NULL,
                record BLOB NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let record: Option<Vec<u8>> = sqlx::query_scalar(
            r#"
            SELECT record FROM user_records WHERE user_id = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO user_records (user_id, record, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                record = excluded.record,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(bytes)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
