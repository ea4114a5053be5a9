//! Gatekeeper REST API
//!
//! This crate provides the Axum-based HTTP API for Gatekeeper: user
//! management, session login and logout, account registration and password
//! reset, all behind the request authorization layer.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
