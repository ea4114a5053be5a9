//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid snapshot kind: {0}")]
    InvalidKind(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
