//! Authorization middleware for Axum

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use gatekeeper_db::User;
use std::sync::Arc;
use tracing::debug;

use crate::authenticator::{Authenticator, Decision};
use crate::error::AuthError;

/// User the request was authenticated as, stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authorization middleware
///
/// Answers 401 when a protected path is requested without credentials and
/// 403 when the credentials resolve to no user. On success the resolved
/// user is added to request extensions. Exempt paths pass through, with the
/// user still attached when the credentials are good.
pub async fn authorize(
    State(authenticator): State<Arc<Authenticator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();
    let credentials = authenticator.credentials_from(request.headers());

    let user = match authenticator.decide(Some(&path), &credentials) {
        Decision::Authenticated(user) => Some(user),
        Decision::Exempt if !credentials.is_empty() => authenticator.current_user(&credentials),
        Decision::Exempt => None,
        Decision::MissingCredentials => {
            debug!("No credentials for {}", path);
            return Err(AuthError::MissingCredentials);
        }
        Decision::Rejected => {
            debug!("Rejected credentials for {}", path);
            return Err(AuthError::Forbidden);
        }
    };

    if let Some(user) = user {
        debug!("Authenticated user: {}", user.meta.id);
        request.extensions_mut().insert(CurrentUser(user));
    }

    Ok(next.run(request).await)
}
