//! Gatekeeper Object Store
//!
//! This crate provides the entity layer for Gatekeeper: kind-partitioned
//! in-memory collections of users and sessions, each persisted as a whole
//! snapshot through a [`gatekeeper_storage::SnapshotBackend`].

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::{Database, Filter, ObjectStore};
pub use utils::{Clock, ManualClock, SystemClock};
