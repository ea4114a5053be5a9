//! Gatekeeper Authentication and Authorization
//!
//! This crate decides, per request, whether a path needs authentication
//! and which user the presented Basic credentials or session cookie belong
//! to. Resolution strategies are composed from configuration rather than
//! layered by inheritance.

pub mod accounts;
pub mod authenticator;
pub mod basic;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod password;
pub mod path;
pub mod session;
pub mod strategy;

pub use accounts::Accounts;
pub use authenticator::{Authenticator, DEFAULT_SESSION_NAME, Decision};
pub use basic::BasicAuth;
pub use error::AuthError;
pub use middleware::{CurrentUser, authorize};
pub use password::{HashScheme, PasswordHasher, hash_password, verify_password};
pub use path::{PathPolicy, UnconfiguredPolicy, requires_auth};
pub use session::{SessionExpiry, SessionManager, spawn_session_sweeper};
pub use strategy::{AuthStrategy, AuthType, BasicStrategy, NoCredentials, RequestCredentials, SessionStrategy};
