//! Local disk snapshot backend

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::backend::{SnapshotBackend, validate_kind};
use crate::error::StorageError;

/// Local disk snapshot backend
///
/// Stores one JSON document per kind:
/// `<base_path>/.db_<kind>.json`
pub struct LocalSnapshots {
    base_path: PathBuf,
}

impl LocalSnapshots {
    /// Create a new local snapshot backend
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base_path = base_path.as_ref().to_path_buf();

        fs::create_dir_all(&base_path).await?;

        info!("Initialized snapshot storage at {:?}", base_path);

        Ok(Self { base_path })
    }

    /// Get the file path for a kind
    fn snapshot_path(&self, kind: &str) -> Result<PathBuf, StorageError> {
        validate_kind(kind)?;
        Ok(self.base_path.join(format!(".db_{}.json", kind)))
    }
}

#[async_trait]
impl SnapshotBackend for LocalSnapshots {
    async fn read_all(&self, kind: &str) -> Result<Option<Bytes>, StorageError> {
        let path = self.snapshot_path(kind)?;
        debug!("Reading snapshot from {:?}", path);

        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write_all(&self, kind: &str, data: Bytes) -> Result<(), StorageError> {
        let path = self.snapshot_path(kind)?;
        debug!("Writing {} byte snapshot to {:?}", data.len(), path);

        // Readers never observe a half-written file
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &data).await?;
        fs::rename(&temp_path, &path).await?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.base_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_snapshot_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalSnapshots::new(dir.path()).await.unwrap();

        assert!(storage.read_all("User").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalSnapshots::new(dir.path()).await.unwrap();

        storage
            .write_all("User", Bytes::from_static(b"{\"a\":1}"))
            .await
            .unwrap();
        storage
            .write_all("User", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        let data = storage.read_all("User").await.unwrap().unwrap();
        assert_eq!(&data[..], b"{}");
        assert!(dir.path().join(".db_User.json").exists());
        assert!(!dir.path().join(".db_User.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_kinds_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalSnapshots::new(dir.path()).await.unwrap();

        storage
            .write_all("User", Bytes::from_static(b"users"))
            .await
            .unwrap();

        assert!(storage.read_all("UserSession").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_kind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalSnapshots::new(dir.path()).await.unwrap();

        let result = storage.write_all("../escape", Bytes::new()).await;
        assert!(matches!(result, Err(StorageError::InvalidKind(_))));
    }
}
