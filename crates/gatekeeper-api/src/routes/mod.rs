//! API routes

mod accounts;
mod extract;
mod health;
mod sessions;
pub mod types;
mod users;

use axum::{Router, middleware};
use gatekeeper_auth::authorize;

use crate::state::AppState;

/// Create the main router
///
/// When authentication is enabled every route sits behind the
/// authorization layer, which decides from the configured exemptions and
/// strategy whether the request may proceed.
pub fn create_router(state: AppState) -> Router {
    let authenticator = state.authenticator.clone();
    let auth_enabled = state.auth_enabled;

    let router = Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(sessions::routes())
        .merge(accounts::routes())
        .with_state(state);

    if auth_enabled {
        router.layer(middleware::from_fn_with_state(authenticator, authorize))
    } else {
        router
    }
}
