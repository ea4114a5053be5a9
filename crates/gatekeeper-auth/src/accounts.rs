//! Account registration and password reset

use gatekeeper_db::{Filter, ObjectStore, User};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AuthError;
use crate::password::PasswordHasher;

/// User-facing account operations
pub struct Accounts {
    users: Arc<ObjectStore<User>>,
    hasher: Arc<dyn PasswordHasher>,
    // Held across the uniqueness check and the save
    registration: Mutex<()>,
}

impl Accounts {
    pub fn new(users: Arc<ObjectStore<User>>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            users,
            hasher,
            registration: Mutex::new(()),
        }
    }

    fn find_by(&self, field: &str, value: &str) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .search(&Filter::new().eq(field, value))?
            .into_iter()
            .next())
    }

    /// Create a user with a hashed password; the email must be unused
    pub async fn register_user(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.register_with(email, password, |_| {}).await
    }

    /// Like [`Accounts::register_user`], letting the caller fill in extra
    /// fields before the user is saved
    pub async fn register_with(
        &self,
        email: &str,
        password: &str,
        fill: impl FnOnce(&mut User),
    ) -> Result<User, AuthError> {
        let _guard = self.registration.lock().await;

        if self.find_by("email", email)?.is_some() {
            return Err(AuthError::UserExists(email.to_string()));
        }

        let mut user = self.users.create(|meta| User::new(meta, email));
        user.password_digest = Some(self.hasher.hash(password)?);
        fill(&mut user);
        self.users.save(&mut user).await?;

        info!("Registered user {}", user.meta.id);
        Ok(user)
    }

    /// Whether the password matches the user registered under `email`
    pub fn valid_login(&self, email: &str, password: &str) -> bool {
        match self.find_by("email", email) {
            Ok(Some(user)) => user
                .password_digest
                .as_deref()
                .is_some_and(|digest| self.hasher.verify(password, digest)),
            _ => false,
        }
    }

    /// User registered under `email`
    pub fn find_by_email(&self, email: &str) -> Result<User, AuthError> {
        self.find_by("email", email)?.ok_or(AuthError::UserNotFound)
    }

    /// Replace a user's password digest
    pub async fn set_password(&self, user: &mut User, password: &str) -> Result<(), AuthError> {
        user.password_digest = Some(self.hasher.hash(password)?);
        self.users.save(user).await?;
        Ok(())
    }

    /// Issue a fresh reset token for the user registered under `email`
    pub async fn reset_password_token(&self, email: &str) -> Result<String, AuthError> {
        let mut user = self.find_by_email(email)?;

        let token = Uuid::new_v4().to_string();
        user.reset_token = Some(token.clone());
        self.users.save(&mut user).await?;

        debug!("Issued reset token for user {}", user.meta.id);
        Ok(token)
    }

    /// Set a new password using a reset token; the token is consumed
    pub async fn update_password(&self, reset_token: &str, password: &str) -> Result<(), AuthError> {
        if reset_token.is_empty() {
            return Err(AuthError::InvalidResetToken);
        }

        let mut user = self
            .find_by("reset_token", reset_token)?
            .ok_or(AuthError::InvalidResetToken)?;

        user.reset_token = None;
        self.set_password(&mut user, password).await?;

        info!("Password updated for user {}", user.meta.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::Sha256Hasher;
    use gatekeeper_db::Database;

    fn accounts(db: &Database) -> Accounts {
        Accounts::new(db.users().clone(), Arc::new(Sha256Hasher))
    }

    #[tokio::test]
    async fn test_register_user() {
        let db = Database::in_memory();
        let accounts = accounts(&db);

        let user = accounts.register_user("a@x.com", "secret").await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_ne!(user.password_digest.as_deref(), Some("secret"));
        assert_eq!(db.users().get(&user.meta.id), Some(user));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let db = Database::in_memory();
        let accounts = accounts(&db);

        accounts.register_user("a@x.com", "secret").await.unwrap();
        let err = accounts.register_user("a@x.com", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::UserExists(email) if email == "a@x.com"));
        assert_eq!(db.users().count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registration_is_unique() {
        let db = Database::in_memory();
        let accounts = Arc::new(accounts(&db));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let accounts = accounts.clone();
            handles.push(tokio::spawn(async move {
                accounts.register_user("race@x.com", "secret").await.is_ok()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(db.users().count(), 1);
    }

    #[tokio::test]
    async fn test_register_with_names() {
        let db = Database::in_memory();
        let accounts = accounts(&db);

        let user = accounts
            .register_with("a@x.com", "secret", |user| {
                user.first_name = Some("Ada".to_string());
            })
            .await
            .unwrap();
        assert_eq!(user.display_name(), "Ada");
    }

    #[tokio::test]
    async fn test_valid_login() {
        let db = Database::in_memory();
        let accounts = accounts(&db);
        accounts.register_user("a@x.com", "secret").await.unwrap();

        assert!(accounts.valid_login("a@x.com", "secret"));
        assert!(!accounts.valid_login("a@x.com", "wrong"));
        assert!(!accounts.valid_login("ghost@x.com", "secret"));
    }

    #[tokio::test]
    async fn test_reset_password_flow() {
        let db = Database::in_memory();
        let accounts = accounts(&db);
        accounts.register_user("a@x.com", "old").await.unwrap();

        let token = accounts.reset_password_token("a@x.com").await.unwrap();
        accounts.update_password(&token, "new").await.unwrap();

        assert!(accounts.valid_login("a@x.com", "new"));
        assert!(!accounts.valid_login("a@x.com", "old"));

        // Tokens are single use
        assert!(matches!(
            accounts.update_password(&token, "again").await,
            Err(AuthError::InvalidResetToken)
        ));
    }

    #[tokio::test]
    async fn test_reset_unknown_email_and_token() {
        let db = Database::in_memory();
        let accounts = accounts(&db);

        assert!(matches!(
            accounts.reset_password_token("ghost@x.com").await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            accounts.update_password("bogus", "new").await,
            Err(AuthError::InvalidResetToken)
        ));
        assert!(matches!(
            accounts.update_password("", "new").await,
            Err(AuthError::InvalidResetToken)
        ));
    }
}
