use crate::error::IdentityError;
use catalog_derive::api_model;
use catalog_kernel::domain::auth::{Principal, Role};
use catalog_kernel::server::{FieldError, Validate};
use std::borrow::Cow;
use surrealdb::types::SurrealValue;

pub const MAX_USERNAME_LENGTH: usize = 255;

/// A stored account. `password_hash` is a PHC string.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal::new(self.username.clone(), self.role)
    }
}

// Keeps the hash out of logs.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User").field("username", &self.username).field("role", &self.role).finish()
    }
}

#[derive(Debug, Clone, SurrealValue)]
pub(crate) struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.as_str().to_owned(),
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = IdentityError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role = record.role.parse::<Role>().map_err(|e| IdentityError::Corrupted {
            message: e.into(),
            context: Some(format!("user {}", record.username).into()),
        })?;
        Ok(Self { username: record.username, password_hash: record.password_hash, role })
    }
}

/// Outcome of one login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub success: bool,
    pub message: Cow<'static, str>,
    pub principal: Option<Principal>,
}

impl LoginResult {
    pub(crate) fn failure(message: &'static str) -> Self {
        Self { success: false, message: Cow::Borrowed(message), principal: None }
    }

    pub(crate) fn success(principal: Principal) -> Self {
        Self { success: true, message: Cow::Borrowed(crate::service::LOGIN_SUCCESSFUL), principal: Some(principal) }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !self.success
    }
}

#[api_model]
#[derive(Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.username.chars().count() > MAX_USERNAME_LENGTH {
            errors.push(FieldError::new("username", "username can not be longer than 255"));
        }
        errors
    }
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub username: String,
    /// `ADMIN` or `USER`
    pub role: String,
    pub message: String,
}

impl LoginResponse {
    pub(crate) fn new(principal: &Principal, message: &str) -> Self {
        Self {
            username: principal.username.clone(),
            role: principal.role.as_str().to_owned(),
            message: message.to_owned(),
        }
    }
}
