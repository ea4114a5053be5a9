//! Basic credential resolution

use gatekeeper_db::{Filter, ObjectStore, User};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::credentials::{decode_base64, extract_basic_token, split_credentials};
use crate::password::PasswordHasher;

/// Resolves users from `Authorization: Basic` headers
#[derive(Clone)]
pub struct BasicAuth {
    users: Arc<ObjectStore<User>>,
    hasher: Arc<dyn PasswordHasher>,
}

impl BasicAuth {
    pub fn new(users: Arc<ObjectStore<User>>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// User owning `email` if `password` matches its digest
    ///
    /// First match wins: when several users share an email only the first
    /// one found is checked, and a mismatch fails without trying the rest.
    pub fn user_from_credentials(&self, email: &str, password: &str) -> Option<User> {
        if email.is_empty() || password.is_empty() {
            return None;
        }

        let candidates = match self.users.search(&Filter::new().eq("email", email)) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("User lookup failed: {}", e);
                return None;
            }
        };

        let user = candidates.into_iter().next()?;
        let digest = user.password_digest.as_deref()?;
        if self.hasher.verify(password, digest) {
            Some(user)
        } else {
            debug!("Password mismatch for user {}", user.meta.id);
            None
        }
    }

    /// Resolve the user behind a raw `Authorization` header value
    pub fn resolve(&self, header: Option<&str>) -> Option<User> {
        let token = extract_basic_token(header)?;
        let decoded = decode_base64(Some(token))?;
        let (email, password) = split_credentials(Some(&decoded))?;
        self.user_from_credentials(email, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::basic_header;
    use crate::password::Sha256Hasher;
    use gatekeeper_db::Database;

    async fn add_user(db: &Database, email: &str, password: Option<&str>) -> User {
        let mut user = db.users().create(|meta| User::new(meta, email));
        user.password_digest = password.map(|p| Sha256Hasher.hash(p).unwrap());
        db.users().save(&mut user).await.unwrap();
        user
    }

    fn basic(db: &Database) -> BasicAuth {
        BasicAuth::new(db.users().clone(), Arc::new(Sha256Hasher))
    }

    #[tokio::test]
    async fn test_resolve_valid_credentials() {
        let db = Database::in_memory();
        let user = add_user(&db, "a@x.com", Some("secret")).await;
        let auth = basic(&db);

        let header = basic_header("a@x.com", "secret");
        assert_eq!(auth.resolve(Some(&header)), Some(user));
    }

    #[tokio::test]
    async fn test_resolve_wrong_password() {
        let db = Database::in_memory();
        add_user(&db, "a@x.com", Some("secret")).await;
        let auth = basic(&db);

        let header = basic_header("a@x.com", "wrong");
        assert!(auth.resolve(Some(&header)).is_none());
    }

    #[tokio::test]
    async fn test_resolve_password_with_colon() {
        let db = Database::in_memory();
        let user = add_user(&db, "a@x.com", Some("se:cr:et")).await;
        let auth = basic(&db);

        let header = basic_header("a@x.com", "se:cr:et");
        assert_eq!(auth.resolve(Some(&header)), Some(user));
    }

    #[tokio::test]
    async fn test_resolve_malformed_headers() {
        let db = Database::in_memory();
        add_user(&db, "a@x.com", Some("secret")).await;
        let auth = basic(&db);

        assert!(auth.resolve(None).is_none());
        assert!(auth.resolve(Some("Bearer abc")).is_none());
        assert!(auth.resolve(Some("Basic !!!")).is_none());
        // "a@x.com" without a separator
        assert!(auth.resolve(Some("Basic YUB4LmNvbQ==")).is_none());
        assert!(auth.resolve(Some(&basic_header("", "secret"))).is_none());
        assert!(auth.resolve(Some(&basic_header("a@x.com", ""))).is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_and_missing_digest() {
        let db = Database::in_memory();
        add_user(&db, "nodigest@x.com", None).await;
        let auth = basic(&db);

        assert!(auth.user_from_credentials("ghost@x.com", "secret").is_none());
        assert!(auth.user_from_credentials("nodigest@x.com", "secret").is_none());
    }

    #[tokio::test]
    async fn test_first_candidate_only() {
        let db = Database::in_memory();
        add_user(&db, "dup@x.com", Some("first")).await;
        let second = add_user(&db, "dup@x.com", Some("second")).await;
        let auth = basic(&db);

        // The second user's password is never tried
        assert!(auth.user_from_credentials("dup@x.com", "second").is_none());
        assert!(auth.user_from_credentials("dup@x.com", "first").is_some());
        assert_ne!(
            auth.user_from_credentials("dup@x.com", "first").map(|u| u.meta.id),
            Some(second.meta.id)
        );
    }
}
