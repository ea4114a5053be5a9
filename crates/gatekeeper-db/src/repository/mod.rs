//! Object store repository

use gatekeeper_storage::{MemorySnapshots, SnapshotBackend};
use std::sync::Arc;
use tracing::info;

use crate::error::DbError;
use crate::models::{User, UserSession};
use crate::utils::{Clock, SystemClock};

mod store;

pub use store::{Filter, ObjectStore};

/// Stores for every entity kind, sharing one backend and clock
#[derive(Clone)]
pub struct Database {
    users: Arc<ObjectStore<User>>,
    sessions: Arc<ObjectStore<UserSession>>,
}

impl Database {
    /// Create empty stores over a backend without loading anything
    pub fn new(backend: Arc<dyn SnapshotBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: Arc::new(ObjectStore::new(backend.clone(), clock.clone())),
            sessions: Arc::new(ObjectStore::new(backend, clock)),
        }
    }

    /// Open the stores and seed them from the latest snapshots
    pub async fn open(backend: Arc<dyn SnapshotBackend>, clock: Arc<dyn Clock>) -> Result<Self, DbError> {
        info!("Opening object store on {}", backend.describe());

        let db = Self::new(backend, clock);
        let users = db.users.load_snapshot().await?;
        let sessions = db.sessions.load_snapshot().await?;

        info!("Loaded {} users and {} sessions", users, sessions);
        Ok(db)
    }

    /// Empty, non-persistent stores on the wall clock
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySnapshots::new()), Arc::new(SystemClock))
    }

    pub fn users(&self) -> &Arc<ObjectStore<User>> {
        &self.users
    }

    pub fn sessions(&self) -> &Arc<ObjectStore<UserSession>> {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entity;
    use crate::utils::ManualClock;
    use chrono::{TimeZone, Utc};
    use gatekeeper_storage::LocalSnapshots;

    // Whole seconds, so reloaded timestamps compare equal
    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_open_seeds_from_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let backend: Arc<dyn SnapshotBackend> = Arc::new(LocalSnapshots::new(dir.path()).await.unwrap());

        let db = Database::open(backend.clone(), clock()).await.unwrap();
        assert_eq!(db.users().count(), 0);

        let mut user = db.users().create(|meta| User::new(meta, "a@x.com"));
        db.users().save(&mut user).await.unwrap();
        let mut session = db.sessions().create(|meta| UserSession::new(meta, user.id()));
        db.sessions().save(&mut session).await.unwrap();

        let reopened = Database::open(backend, clock()).await.unwrap();
        assert_eq!(reopened.users().get(&user.meta.id), Some(user));
        assert_eq!(reopened.sessions().get(session.token()), Some(session));
    }

    #[test]
    fn test_in_memory_is_empty() {
        let db = Database::in_memory();
        assert_eq!(db.users().count(), 0);
        assert_eq!(db.sessions().count(), 0);
        assert_eq!(db.users().kind(), "User");
        assert_eq!(db.sessions().kind(), "UserSession");
    }
}
