//! Current-user resolution strategies

use gatekeeper_db::{ObjectStore, User};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::basic::BasicAuth;
use crate::session::SessionManager;

/// Credentials presented by one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    /// Raw `Authorization` header value
    pub authorization: Option<String>,
    /// Value of the session cookie
    pub session_token: Option<String>,
}

impl RequestCredentials {
    pub fn is_empty(&self) -> bool {
        self.authorization.is_none() && self.session_token.is_none()
    }
}

/// Resolves the user a request acts as
pub trait AuthStrategy: Send + Sync {
    fn current_user(&self, credentials: &RequestCredentials) -> Option<User>;

    fn name(&self) -> &'static str;
}

/// Accepts nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl AuthStrategy for NoCredentials {
    fn current_user(&self, _credentials: &RequestCredentials) -> Option<User> {
        None
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// HTTP Basic credentials checked against stored digests
pub struct BasicStrategy {
    basic: BasicAuth,
}

impl BasicStrategy {
    pub fn new(basic: BasicAuth) -> Self {
        Self { basic }
    }
}

impl AuthStrategy for BasicStrategy {
    fn current_user(&self, credentials: &RequestCredentials) -> Option<User> {
        self.basic.resolve(credentials.authorization.as_deref())
    }

    fn name(&self) -> &'static str {
        "basic"
    }
}

/// Session cookie resolved through the session manager
pub struct SessionStrategy {
    sessions: Arc<SessionManager>,
    users: Arc<ObjectStore<User>>,
}

impl SessionStrategy {
    pub fn new(sessions: Arc<SessionManager>, users: Arc<ObjectStore<User>>) -> Self {
        Self { sessions, users }
    }
}

impl AuthStrategy for SessionStrategy {
    fn current_user(&self, credentials: &RequestCredentials) -> Option<User> {
        let user_id = self
            .sessions
            .user_id_for_session(credentials.session_token.as_deref())?;
        self.users.get(&user_id)
    }

    fn name(&self) -> &'static str {
        "session"
    }
}

/// Error type for parsing an auth type
#[derive(Debug, Clone)]
pub struct ParseAuthTypeError(String);

impl fmt::Display for ParseAuthTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid auth type: {}", self.0)
    }
}

impl std::error::Error for ParseAuthTypeError {}

/// Which strategy a deployment authenticates with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// Path checks only; no credentials are ever accepted
    Auth,
    #[default]
    BasicAuth,
    SessionAuth,
    /// Session cookies that expire after the configured duration
    SessionExpAuth,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Auth => "auth",
            AuthType::BasicAuth => "basic_auth",
            AuthType::SessionAuth => "session_auth",
            AuthType::SessionExpAuth => "session_exp_auth",
        }
    }

    pub fn uses_sessions(&self) -> bool {
        matches!(self, AuthType::SessionAuth | AuthType::SessionExpAuth)
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = ParseAuthTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auth" => Ok(AuthType::Auth),
            "basic_auth" => Ok(AuthType::BasicAuth),
            "session_auth" => Ok(AuthType::SessionAuth),
            "session_exp_auth" => Ok(AuthType::SessionExpAuth),
            _ => Err(ParseAuthTypeError(s.to_string())),
        }
    }
}
