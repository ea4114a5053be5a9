//! Session login and logout routes

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Response},
    routing::{delete, post},
};
use gatekeeper_auth::AuthError;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CredentialsForm, UserResponse, required};

/// POST /api/v1/auth_session/login
async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    let email = required(form.email, "email")?;
    let password = required(form.password, "password")?;

    let user = state
        .accounts
        .find_by_email(&email)
        .map_err(|_| ApiError::NotFound("no user found for this email".to_string()))?;

    if !state.accounts.valid_login(&email, &password) {
        debug!("Wrong password for user {}", user.meta.id);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state
        .authenticator
        .sessions()
        .create_session(&user.meta.id)
        .await?;

    info!("User {} logged in", user.meta.id);

    let cookie = format!(
        "{}={}; Path=/; HttpOnly",
        state.authenticator.session_name(),
        token
    );
    Ok(([(SET_COOKIE, cookie)], Json(UserResponse::from(&user))).into_response())
}

/// DELETE /api/v1/auth_session/logout
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let credentials = state.authenticator.credentials_from(&headers);
    let sessions = state.authenticator.sessions();

    let token = credentials
        .session_token
        .filter(|token| sessions.user_id_for_session(Some(token)).is_some())
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))?;

    sessions.destroy_token(&token).await?;
    debug!("Session closed");

    Ok(Json(json!({})))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth_session/login", post(login))
        .route("/api/v1/auth_session/logout", delete(logout))
}
