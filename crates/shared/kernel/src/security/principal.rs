use crate::server::error::ApiError;
use crate::server::state::ApiState;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use catalog_domain::auth::Principal;
use std::ops::Deref;

/// The authenticated caller, placed in the request extensions by the auth middleware.
///
/// Rejects with 401, challenging for the configured `security.realm`, when the route was not
/// wrapped by the middleware.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl Deref for CurrentUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    ApiState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(Self(principal.clone()));
        }
        let state = ApiState::from_ref(state);
        Err(ApiError::unauthorized("Missing or invalid Authorization header", &state.config.security.realm))
    }
}
