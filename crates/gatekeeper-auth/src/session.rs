//! Session management
//!
//! A session is a `UserSession` record whose id is the token handed to the
//! client. Expiry is computed when a token is read; expired records stay in
//! the store until they are destroyed or purged.

use chrono::{DateTime, Duration, Utc};
use gatekeeper_db::{ObjectStore, UserSession};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// How long a session stays valid after it was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionExpiry {
    #[default]
    Never,
    After(Duration),
}

impl SessionExpiry {
    /// Non-positive durations never expire
    pub fn from_seconds(seconds: i64) -> Self {
        if seconds > 0 {
            SessionExpiry::After(Duration::seconds(seconds))
        } else {
            SessionExpiry::Never
        }
    }

    /// Parse a configured duration in seconds
    ///
    /// Absent, non-integer and non-positive values all mean no expiry.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return SessionExpiry::Never;
        };

        match raw.trim().parse::<i64>() {
            Ok(seconds) => Self::from_seconds(seconds),
            Err(_) => {
                warn!("Ignoring invalid session duration {:?}; sessions will not expire", raw);
                SessionExpiry::Never
            }
        }
    }

    /// Strictly past `created_at + duration`
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            SessionExpiry::Never => false,
            SessionExpiry::After(duration) => created_at + *duration < now,
        }
    }

    /// Configured duration in seconds, 0 when sessions never expire
    pub fn seconds(&self) -> i64 {
        match self {
            SessionExpiry::Never => 0,
            SessionExpiry::After(duration) => duration.num_seconds(),
        }
    }
}

/// Creates, resolves and destroys sessions
pub struct SessionManager {
    sessions: Arc<ObjectStore<UserSession>>,
    expiry: SessionExpiry,
}

impl SessionManager {
    pub fn new(sessions: Arc<ObjectStore<UserSession>>, expiry: SessionExpiry) -> Self {
        Self { sessions, expiry }
    }

    pub fn expiry(&self) -> SessionExpiry {
        self.expiry
    }

    /// Start a session for a user and return its token
    pub async fn create_session(&self, user_id: &str) -> Result<String, AuthError> {
        if user_id.is_empty() {
            return Err(AuthError::UserNotFound);
        }

        let mut session = self.sessions.create(|meta| UserSession::new(meta, user_id));
        self.sessions.save(&mut session).await?;

        debug!("Created session for user {}", user_id);
        Ok(session.meta.id)
    }

    /// User id behind a token, if the session exists and has not expired
    pub fn user_id_for_session(&self, token: Option<&str>) -> Option<String> {
        let token = token.filter(|t| !t.is_empty())?;
        let session = self.sessions.get(token)?;

        let now = self.sessions.clock().now();
        if self.expiry.is_expired(session.meta.created_at, now) {
            debug!("Session for user {} has expired", session.user_id);
            return None;
        }

        Some(session.user_id)
    }

    /// Remove every session of a user, returning how many were removed
    pub async fn destroy_session(&self, user_id: &str) -> Result<usize, AuthError> {
        let removed = self
            .sessions
            .retain(|session| session.user_id != user_id)
            .await?;

        if removed > 0 {
            debug!("Destroyed {} sessions for user {}", removed, user_id);
        }
        Ok(removed)
    }

    /// Remove the session behind a single token
    pub async fn destroy_token(&self, token: &str) -> Result<bool, AuthError> {
        match self.sessions.get(token) {
            Some(session) => Ok(self.sessions.remove(&session).await?),
            None => Ok(false),
        }
    }

    /// Drop expired session records from the store
    pub async fn purge_expired(&self) -> Result<usize, AuthError> {
        if self.expiry == SessionExpiry::Never {
            return Ok(0);
        }

        let now = self.sessions.clock().now();
        let expiry = self.expiry;
        let removed = self
            .sessions
            .retain(|session| !expiry.is_expired(session.meta.created_at, now))
            .await?;
        Ok(removed)
    }
}

/// Spawn a background task that purges expired sessions
pub fn spawn_session_sweeper(
    manager: Arc<SessionManager>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    use tokio::time::{Duration, interval};

    info!(
        "Starting background session sweeper (interval: {} seconds)",
        interval_secs
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));

        // The first tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match manager.purge_expired().await {
                Ok(removed) => {
                    if removed > 0 {
                        info!("Session sweep: {} expired sessions removed", removed);
                    }
                }
                Err(e) => {
                    warn!("Session sweep failed: {}", e);
                }
            }
        }
    })
}
