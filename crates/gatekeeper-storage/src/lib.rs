//! Gatekeeper Snapshot Storage
//!
//! This crate provides the durable side of the object store: whole-kind
//! snapshots written to local disk, SQLite, or kept in memory.

pub mod backend;
pub mod error;
pub mod local;
pub mod memory;
pub mod sqlite;

pub use backend::SnapshotBackend;
pub use error::StorageError;
pub use local::LocalSnapshots;
pub use memory::MemorySnapshots;
pub use sqlite::SqliteSnapshots;
