//! User management routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use gatekeeper_db::User;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::extract::MaybeUser;
use super::types::{CreateUserRequest, UpdateUserRequest, UserResponse, required};

/// Path segment that stands for the authenticated user
const ME: &str = "me";

fn find_user(state: &AppState, id: &str) -> Result<User, ApiError> {
    state
        .db
        .users()
        .get(id)
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))
}

/// GET /api/v1/users
async fn list_users(State(state): State<AppState>) -> Json<Vec<UserResponse>> {
    Json(state.db.users().all().iter().map(UserResponse::from).collect())
}

/// GET /api/v1/users/{id}
async fn get_user(
    State(state): State<AppState>,
    MaybeUser(current): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    if id == ME {
        let user = current.ok_or_else(|| ApiError::NotFound("Not found".to_string()))?;
        return Ok(Json(UserResponse::from(&user)));
    }

    let user = find_user(&state, &id)?;
    Ok(Json(UserResponse::from(&user)))
}

/// POST /api/v1/users
async fn create_user(
    State(state): State<AppState>,
    request: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let email = required(request.email, "email")?;
    let password = required(request.password, "password")?;

    debug!("Creating user");

    let (first_name, last_name) = (request.first_name, request.last_name);
    let user = state
        .accounts
        .register_with(&email, &password, |user| {
            user.first_name = first_name;
            user.last_name = last_name;
        })
        .await?;

    info!("Created user: {}", user.meta.id);

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// PUT /api/v1/users/{id}
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let mut user = find_user(&state, &id)?;
    let Ok(Json(request)) = request else {
        return Err(ApiError::BadRequest("Wrong format".to_string()));
    };

    let mut changes = Map::new();
    if let Some(first_name) = request.first_name {
        changes.insert("first_name".to_string(), Value::String(first_name));
    }
    if let Some(last_name) = request.last_name {
        changes.insert("last_name".to_string(), Value::String(last_name));
    }

    state.db.users().update(&mut user, &changes).await?;

    info!("Updated user: {}", user.meta.id);

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/v1/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = find_user(&state, &id)?;

    state.db.users().remove(&user).await?;
    info!("Deleted user {}", user.meta.id);

    // The user is already gone; leftover sessions resolve to no one
    match state
        .authenticator
        .sessions()
        .destroy_session(&user.meta.id)
        .await
    {
        Ok(removed) => debug!("Removed {} sessions of user {}", removed, user.meta.id),
        Err(e) => warn!("Failed to remove sessions of user {}: {}", user.meta.id, e),
    }

    Ok(Json(json!({})))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users", get(list_users).post(create_user))
        .route(
            "/api/v1/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}
