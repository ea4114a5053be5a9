//! Object store error types

use gatekeeper_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Snapshot storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
