//! Entity models

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::timestamp;

/// Fields every entity carries and no update may touch
pub const META_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Identity and timestamps shared by all entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl EntityMeta {
    /// Fresh identity stamped at `now`
    ///
    /// Timestamps keep full precision in memory; snapshots store whole
    /// seconds.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at`; it never moves backwards
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// A record kept in an [`crate::ObjectStore`]
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind name, used as the snapshot key
    const KIND: &'static str;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> &str {
        &self.meta().id
    }
}

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub email: String,
    #[serde(default)]
    pub password_digest: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub reset_token: Option<String>,
}

impl User {
    pub fn new(meta: EntityMeta, email: impl Into<String>) -> Self {
        Self {
            meta,
            email: email.into(),
            password_digest: None,
            first_name: None,
            last_name: None,
            reset_token: None,
        }
    }

    /// Name to show for the user, falling back to the email
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

impl Entity for User {
    const KIND: &'static str = "User";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

/// Session record; the entity id doubles as the session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(flatten)]
    pub meta: EntityMeta,
    pub user_id: String,
}

impl UserSession {
    pub fn new(meta: EntityMeta, user_id: impl Into<String>) -> Self {
        Self {
            meta,
            user_id: user_id.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.meta.id
    }
}

impl Entity for UserSession {
    const KIND: &'static str = "UserSession";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn meta() -> EntityMeta {
        EntityMeta::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_meta_keeps_precision_and_never_rewinds() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::milliseconds(750);
        let mut meta = EntityMeta::new(now);
        assert_eq!(meta.created_at, now);
        assert_eq!(meta.created_at, meta.updated_at);

        meta.touch(now + Duration::seconds(10));
        assert_eq!(meta.updated_at, meta.created_at + Duration::seconds(10));

        meta.touch(now - Duration::seconds(60));
        assert_eq!(meta.updated_at, meta.created_at + Duration::seconds(10));
    }

    #[test]
    fn test_snapshot_drops_subseconds() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::milliseconds(900);
        let user = User::new(EntityMeta::new(now), "bob@example.com");

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["created_at"], "2024-01-01T12:00:00");

        let back: User = serde_json::from_value(value).unwrap();
        assert_eq!(back.meta.created_at, now - Duration::milliseconds(900));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(meta().id, meta().id);
    }

    #[test]
    fn test_display_name() {
        let mut user = User::new(meta(), "bob@example.com");
        assert_eq!(user.display_name(), "bob@example.com");

        user.last_name = Some("Dylan".to_string());
        assert_eq!(user.display_name(), "Dylan");

        user.first_name = Some("Bob".to_string());
        assert_eq!(user.display_name(), "Bob Dylan");

        user.last_name = None;
        assert_eq!(user.display_name(), "Bob");
    }

    #[test]
    fn test_user_snapshot_fields() {
        let mut user = User::new(meta(), "bob@example.com");
        user.password_digest = Some("digest".to_string());

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["email"], "bob@example.com");
        assert_eq!(value["created_at"], "2024-01-01T12:00:00");
        assert_eq!(value["password_digest"], "digest");
        assert!(value["first_name"].is_null());

        let back: User = serde_json::from_value(value).unwrap();
        assert_eq!(back, user);
    }

    #[test]
    fn test_user_loads_without_optional_fields() {
        let value = serde_json::json!({
            "id": "abc",
            "created_at": "2024-01-01T12:00:00",
            "updated_at": "2024-01-02T12:00:00",
            "email": "old@example.com"
        });

        let user: User = serde_json::from_value(value).unwrap();
        assert_eq!(user.id(), "abc");
        assert!(user.password_digest.is_none());
        assert!(user.reset_token.is_none());
    }
}
