//! Request authorization decisions

use axum::http::header::{AUTHORIZATION, COOKIE, HeaderName};
use axum::http::HeaderMap;
use gatekeeper_db::{Database, User};
use std::sync::Arc;
use tracing::debug;

use crate::basic::BasicAuth;
use crate::credentials::cookie_value;
use crate::password::PasswordHasher;
use crate::path::PathPolicy;
use crate::session::{SessionExpiry, SessionManager};
use crate::strategy::{
    AuthStrategy, AuthType, BasicStrategy, NoCredentials, RequestCredentials, SessionStrategy,
};

/// Default name of the session cookie
pub const DEFAULT_SESSION_NAME: &str = "_my_session_id";

/// Outcome of authorizing one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Path needs no authentication
    Exempt,
    Authenticated(User),
    /// No credentials were presented (401)
    MissingCredentials,
    /// Credentials were presented but resolve to no user (403)
    Rejected,
}

/// Path policy plus the configured user resolution strategy
pub struct Authenticator {
    paths: PathPolicy,
    strategy: Box<dyn AuthStrategy>,
    sessions: Arc<SessionManager>,
    session_name: String,
}

impl Authenticator {
    pub fn new(
        paths: PathPolicy,
        strategy: Box<dyn AuthStrategy>,
        sessions: Arc<SessionManager>,
        session_name: impl Into<String>,
    ) -> Self {
        Self {
            paths,
            strategy,
            sessions,
            session_name: session_name.into(),
        }
    }

    /// Compose the strategy for an [`AuthType`]
    ///
    /// `expiry` only takes effect for [`AuthType::SessionExpAuth`]; plain
    /// session auth never expires sessions.
    pub fn from_type(
        auth_type: AuthType,
        db: &Database,
        hasher: Arc<dyn PasswordHasher>,
        paths: PathPolicy,
        session_name: impl Into<String>,
        expiry: SessionExpiry,
    ) -> Self {
        let expiry = match auth_type {
            AuthType::SessionExpAuth => expiry,
            _ => SessionExpiry::Never,
        };
        let sessions = Arc::new(SessionManager::new(db.sessions().clone(), expiry));

        let strategy: Box<dyn AuthStrategy> = match auth_type {
            AuthType::Auth => Box::new(NoCredentials),
            AuthType::BasicAuth => Box::new(BasicStrategy::new(BasicAuth::new(
                db.users().clone(),
                hasher,
            ))),
            AuthType::SessionAuth | AuthType::SessionExpAuth => Box::new(SessionStrategy::new(
                sessions.clone(),
                db.users().clone(),
            )),
        };

        debug!(
            "Authenticator uses {} strategy (session expiry: {}s)",
            strategy.name(),
            expiry.seconds()
        );

        Self::new(paths, strategy, sessions, session_name)
    }

    pub fn require_auth(&self, path: Option<&str>) -> bool {
        self.paths.requires_auth(path)
    }

    pub fn authorization_header<'a>(&self, header: Option<&'a str>) -> Option<&'a str> {
        header
    }

    /// Session token from a `Cookie` header
    pub fn session_cookie<'a>(&self, cookies: Option<&'a str>) -> Option<&'a str> {
        cookie_value(cookies, &self.session_name)
    }

    /// Collect the credentials carried by request headers
    pub fn credentials_from(&self, headers: &HeaderMap) -> RequestCredentials {
        let header = |name: HeaderName| headers.get(name).and_then(|value| value.to_str().ok());

        RequestCredentials {
            authorization: self
                .authorization_header(header(AUTHORIZATION))
                .map(str::to_string),
            session_token: self.session_cookie(header(COOKIE)).map(str::to_string),
        }
    }

    pub fn current_user(&self, credentials: &RequestCredentials) -> Option<User> {
        self.strategy.current_user(credentials)
    }

    pub fn decide(&self, path: Option<&str>, credentials: &RequestCredentials) -> Decision {
        if !self.require_auth(path) {
            return Decision::Exempt;
        }
        if credentials.is_empty() {
            return Decision::MissingCredentials;
        }
        match self.current_user(credentials) {
            Some(user) => Decision::Authenticated(user),
            None => Decision::Rejected,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn paths(&self) -> &PathPolicy {
        &self.paths
    }
}
