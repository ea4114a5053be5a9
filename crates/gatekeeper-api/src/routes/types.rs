//! Request/Response DTOs

use gatekeeper_db::User;
use gatekeeper_db::utils::format_timestamp;
use serde::{Deserialize, Serialize};

// ==================== User Types ====================

/// Create user request
///
/// Fields are optional so that missing ones produce a readable 400.
#[derive(Deserialize, Default)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Update user request
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// User response (without password digest or reset token)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.meta.id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            display_name: user.display_name(),
            created_at: format_timestamp(&user.meta.created_at),
            updated_at: format_timestamp(&user.meta.updated_at),
        }
    }
}

// ==================== Session Types ====================

/// Form fields shared by login and registration
#[derive(Deserialize, Default)]
pub struct CredentialsForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

// ==================== Account Types ====================

/// Reset token request form
#[derive(Deserialize, Default)]
pub struct ResetTokenForm {
    pub email: Option<String>,
}

/// Password update form
#[derive(Deserialize, Default)]
pub struct UpdatePasswordForm {
    pub email: Option<String>,
    pub reset_token: Option<String>,
    pub new_password: Option<String>,
}

/// Registration / password change acknowledgement
#[derive(Serialize)]
pub struct AccountResponse {
    pub email: String,
    pub message: String,
}

/// Issued reset token
#[derive(Serialize)]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}

// ==================== Status Types ====================

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Entity counts
#[derive(Serialize)]
pub struct StatsResponse {
    pub users: usize,
    pub sessions: usize,
}

/// Treat an absent or empty form field as missing
pub fn required(value: Option<String>, name: &str) -> Result<String, crate::ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| crate::ApiError::BadRequest(format!("{} missing", name)))
}
