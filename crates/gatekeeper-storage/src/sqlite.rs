//! SQLite snapshot backend

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::backend::{SnapshotBackend, validate_kind};
use crate::error::StorageError;

/// SQLite snapshot backend
///
/// Keeps one row per kind in a `snapshots` table, so a relational
/// database can stand in for the snapshot directory.
#[derive(Clone)]
pub struct SqliteSnapshots {
    pool: SqlitePool,
}

impl SqliteSnapshots {
    /// Connect to a database and prepare the schema
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        info!("Connecting to snapshot database: {}", database_url);

        let pool = SqlitePool::connect(database_url).await?;
        Self::with_pool(pool).await
    }

    /// Use an existing pool
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        let storage = Self { pool };
        storage.run_migrations().await?;
        Ok(storage)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS snapshots (
                kind TEXT PRIMARY KEY,
                data BLOB NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SnapshotBackend for SqliteSnapshots {
    async fn read_all(&self, kind: &str) -> Result<Option<Bytes>, StorageError> {
        validate_kind(kind)?;
        debug!("Reading snapshot for kind {}", kind);

        let row = sqlx::query("SELECT data FROM snapshots WHERE kind = ?")
            .bind(kind)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Bytes::from(row.get::<Vec<u8>, _>("data"))))
    }

    async fn write_all(&self, kind: &str, data: Bytes) -> Result<(), StorageError> {
        validate_kind(kind)?;
        debug!("Writing {} byte snapshot for kind {}", data.len(), kind);

        sqlx::query(
            r#"
            INSERT INTO snapshots (kind, data, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(kind) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at
            "#,
        )
        .bind(kind)
        .bind(data.to_vec())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn describe(&self) -> String {
        "sqlite".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_storage() -> SqliteSnapshots {
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteSnapshots::with_pool(pool).await.unwrap()
    }

    #[tokio::test]
    async fn test_read_missing_kind() {
        let storage = memory_storage().await;
        assert!(storage.read_all("User").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_snapshot() {
        let storage = memory_storage().await;

        storage
            .write_all("User", Bytes::from_static(b"first"))
            .await
            .unwrap();
        storage
            .write_all("User", Bytes::from_static(b"second"))
            .await
            .unwrap();

        let data = storage.read_all("User").await.unwrap().unwrap();
        assert_eq!(&data[..], b"second");

        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM snapshots")
            .fetch_one(&storage.pool)
            .await
            .unwrap()
            .get("count");
        assert_eq!(count, 1);
    }
}
