//! Account registration and password reset routes

use axum::{
    Form, Json, Router,
    extract::State,
    routing::post,
};
use gatekeeper_auth::AuthError;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{
    AccountResponse, CredentialsForm, ResetTokenForm, ResetTokenResponse, UpdatePasswordForm,
    required,
};

/// POST /api/v1/accounts
async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<AccountResponse>, ApiError> {
    let email = required(form.email, "email")?;
    let password = required(form.password, "password")?;

    let user = state.accounts.register_user(&email, &password).await?;
    info!("Account created for user {}", user.meta.id);

    Ok(Json(AccountResponse {
        email,
        message: "User created".to_string(),
    }))
}

/// POST /api/v1/reset_password
async fn reset_token(
    State(state): State<AppState>,
    Form(form): Form<ResetTokenForm>,
) -> Result<Json<ResetTokenResponse>, ApiError> {
    let email = form.email.unwrap_or_default();

    let reset_token = state
        .accounts
        .reset_password_token(&email)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => ApiError::Forbidden,
            other => ApiError::from(other),
        })?;

    Ok(Json(ResetTokenResponse { email, reset_token }))
}

/// PUT /api/v1/reset_password
async fn update_password(
    State(state): State<AppState>,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<Json<AccountResponse>, ApiError> {
    let reset_token = form.reset_token.unwrap_or_default();
    let password = required(form.new_password, "new_password")?;

    state.accounts.update_password(&reset_token, &password).await?;

    Ok(Json(AccountResponse {
        email: form.email.unwrap_or_default(),
        message: "Password updated".to_string(),
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/accounts", post(register))
        .route("/api/v1/reset_password", post(reset_token).put(update_password))
}
