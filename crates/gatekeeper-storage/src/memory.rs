//! In-memory snapshot backend

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::backend::{SnapshotBackend, validate_kind};
use crate::error::StorageError;

/// Snapshot backend that never touches disk
///
/// Used when persistence is disabled and as an isolated backend in tests.
#[derive(Default)]
pub struct MemorySnapshots {
    snapshots: Mutex<HashMap<String, Bytes>>,
    writes: Mutex<usize>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current snapshot for a kind
    pub fn snapshot(&self, kind: &str) -> Option<Bytes> {
        self.snapshots.lock().get(kind).cloned()
    }

    /// Total number of writes accepted so far
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

#[async_trait]
impl SnapshotBackend for MemorySnapshots {
    async fn read_all(&self, kind: &str) -> Result<Option<Bytes>, StorageError> {
        validate_kind(kind)?;
        Ok(self.snapshot(kind))
    }

    async fn write_all(&self, kind: &str, data: Bytes) -> Result<(), StorageError> {
        validate_kind(kind)?;
        self.snapshots.lock().insert(kind.to_string(), data);
        *self.writes.lock() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
