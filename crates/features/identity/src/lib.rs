//! Identity feature slice.
//!
//! Stores accounts in the `user` table, checks HTTP Basic credentials on protected routes
//! and locks an account for a while after repeated failures.
mod attempts;
mod error;
pub mod middleware;
mod model;
pub mod password;
mod repository;
mod router;
mod seed;
mod service;

pub use crate::attempts::LoginAttempts;
pub use crate::error::{IdentityError, IdentityErrorExt};
pub use crate::middleware::authenticate;
pub use crate::model::{LoginRequest, LoginResponse, LoginResult, User};
pub use crate::repository::{SurrealUserRepository, UserRepository};
pub use crate::router::{AUTH_TAG, public_router, router};
pub use crate::seed::{DEFAULT_USERS, seed};
pub use crate::service::{
    ACCOUNT_LOCKED, AuthService, INVALID_PASSWORD, LOGIN_REQUIRES_CREDENTIALS, LOGIN_SUCCESSFUL,
    LOGOUT_SUCCESSFUL, USER_NOT_FOUND,
};

use catalog_database::{Database, Migration};
use catalog_event_bus::EventBus;
use catalog_kernel::domain::config::SecurityConfig;
use catalog_kernel::domain::registry::InitializedSlice;
use std::time::Duration;

pub const MODULE: &str = "identity";

/// Identity feature state.
#[catalog_derive::catalog_slice]
pub struct Identity {
    pub service: AuthService<SurrealUserRepository>,
    realm: String,
}

impl IdentityInner {
    /// Realm announced in `WWW-Authenticate` challenges.
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }
}

#[must_use]
pub fn migrations() -> Vec<Migration> {
    vec![Migration::new(MODULE, 1, "user table", include_str!("../migrations/0001_init.surql"))]
}

/// Initialize the identity feature.
///
/// # Errors
/// `Validation` if the realm is empty or cannot be quoted in a challenge header.
pub fn init(
    security: &SecurityConfig,
    database: &Database,
    events: &EventBus,
) -> Result<InitializedSlice, IdentityError> {
    if security.realm.trim().is_empty() || security.realm.contains(['"', '\\', '\n', '\r']) {
        return Err(IdentityError::Validation {
            message: format!("invalid realm {:?}", security.realm).into(),
            context: Some("security.realm".into()),
        });
    }

    let attempts = LoginAttempts::new(
        security.max_login_attempts,
        Duration::from_secs(security.lockout_seconds),
        security.attempts_cache_capacity,
    );
    let service = AuthService::new(SurrealUserRepository::new(database.clone()), attempts, events.clone());

    tracing::info!(
        max_attempts = security.max_login_attempts,
        lockout_seconds = security.lockout_seconds,
        "Identity slice initialized"
    );

    Ok(InitializedSlice::new(Identity::new(IdentityInner { service, realm: security.realm.clone() })))
}
