//! Application state

use gatekeeper_auth::{Accounts, Authenticator};
use gatekeeper_db::Database;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub authenticator: Arc<Authenticator>,
    pub accounts: Arc<Accounts>,
    pub auth_enabled: bool,
}

impl AppState {
    pub fn new(
        db: Database,
        authenticator: Arc<Authenticator>,
        accounts: Arc<Accounts>,
        auth_enabled: bool,
    ) -> Self {
        Self {
            db,
            authenticator,
            accounts,
            auth_enabled,
        }
    }
}
