//! Snapshot backend trait

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageError;

/// Snapshot backend trait
///
/// A backend stores exactly one document per entity kind. Every write
/// replaces the previous document for that kind; there is no partial
/// update.
#[async_trait]
pub trait SnapshotBackend: Send + Sync {
    /// Read the latest snapshot for a kind, `None` if none was ever written
    async fn read_all(&self, kind: &str) -> Result<Option<Bytes>, StorageError>;

    /// Replace the snapshot for a kind
    async fn write_all(&self, kind: &str, data: Bytes) -> Result<(), StorageError>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Validate an entity kind name before it is used as a file name or key
///
/// Kinds are type names such as `User` or `UserSession`, so anything other
/// than ASCII alphanumerics and underscores is rejected.
pub fn validate_kind(kind: &str) -> Result<(), StorageError> {
    if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StorageError::InvalidKind(kind.to_string()));
    }
    Ok(())
}
