//! Status endpoints

use axum::{Json, Router, extract::State, routing::get};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{StatsResponse, StatusResponse};

/// GET /api/v1/status
async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}

/// GET /api/v1/stats
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        users: state.db.users().count(),
        sessions: state.db.sessions().count(),
    })
}

/// GET /api/v1/unauthorized
async fn unauthorized() -> ApiError {
    ApiError::Unauthorized
}

/// GET /api/v1/forbidden
async fn forbidden() -> ApiError {
    ApiError::Forbidden
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/status", get(status))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/unauthorized", get(unauthorized))
        .route("/api/v1/forbidden", get(forbidden))
}
