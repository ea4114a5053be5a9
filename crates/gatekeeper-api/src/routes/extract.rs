//! Request extractors

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use gatekeeper_auth::CurrentUser;
use gatekeeper_db::User;
use std::convert::Infallible;

/// User attached by the authorization layer, if any
pub struct MaybeUser(pub Option<User>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .map(|CurrentUser(user)| user.clone());
        Ok(MaybeUser(user))
    }
}
