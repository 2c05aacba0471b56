use crate::attempts::LoginAttempts;
use crate::error::IdentityError;
use crate::model::{LoginResult, User};
use crate::password;
use crate::repository::UserRepository;
use catalog_event_bus::EventBus;
use catalog_kernel::domain::audit::{AuditAction, AuditEvent};
use catalog_kernel::domain::auth::Role;
use catalog_kernel::domain::constants::{ANONYMOUS, USER};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const LOGIN_SUCCESSFUL: &str = "Login successful";
pub const LOGIN_REQUIRES_CREDENTIALS: &str = "login requires username and password";
pub const ACCOUNT_LOCKED: &str = "Login failed: account locked due to too many attempts";
pub const USER_NOT_FOUND: &str = "Login failed: user not found";
pub const INVALID_PASSWORD: &str = "Login failed: invalid password";
pub const LOGOUT_SUCCESSFUL: &str = "Logout successful";

/// Credential checks, account registration and login auditing.
#[derive(Debug)]
pub struct AuthService<R> {
    repository: Arc<R>,
    attempts: LoginAttempts,
    events: EventBus,
}

impl<R> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            attempts: self.attempts.clone(),
            events: self.events.clone(),
        }
    }
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repository: R, attempts: LoginAttempts, events: EventBus) -> Self {
        Self { repository: Arc::new(repository), attempts, events }
    }

    /// Checks a username/password pair.
    ///
    /// Unknown users and wrong passwords count towards the lockout; success clears it.
    ///
    /// # Errors
    /// Storage failures and a panicked password worker. Rejected credentials are an
    /// unsuccessful [`LoginResult`].
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, IdentityError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Ok(LoginResult::failure(LOGIN_REQUIRES_CREDENTIALS));
        }
        if self.attempts.is_locked(username) {
            return Ok(LoginResult::failure(ACCOUNT_LOCKED));
        }

        let Some(user) = self.repository.find_by_username(username).await? else {
            self.attempts.record_failure(username);
            return Ok(LoginResult::failure(USER_NOT_FOUND));
        };
        if !password::verify_blocking(password, &user.password_hash).await? {
            self.attempts.record_failure(username);
            return Ok(LoginResult::failure(INVALID_PASSWORD));
        }

        self.attempts.reset(username);
        debug!(user = %user.username, role = %user.role, "Login successful");
        Ok(LoginResult::success(user.principal()))
    }

    /// Creates an account after checking password complexity.
    ///
    /// # Errors
    /// `Validation` for a blank or overlong username or a weak password, `Conflict` when the
    /// username is taken, storage failures otherwise.
    pub async fn register(&self, username: &str, password: &str, role: Role) -> Result<User, IdentityError> {
        let username = username.trim();
        if username.is_empty() || username.chars().count() > crate::model::MAX_USERNAME_LENGTH {
            return Err(IdentityError::Validation {
                message: "username must be 1 to 255 characters".into(),
                context: None,
            });
        }

        let password_hash = password::hash_blocking(password).await?;
        let user = User { username: username.to_owned(), password_hash, role };
        self.repository.insert(&user).await?;
        info!(user = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    /// Registers the account unless the username already exists. Returns `true` when created.
    ///
    /// # Errors
    /// Same as [`AuthService::register`], except that an existing user is not an error.
    pub async fn ensure_user(&self, username: &str, password: &str, role: Role) -> Result<bool, IdentityError> {
        if self.repository.find_by_username(username).await?.is_some() {
            return Ok(false);
        }
        match self.register(username, password, role).await {
            Ok(_) => Ok(true),
            Err(IdentityError::Conflict { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// # Errors
    /// Storage failures.
    pub async fn find_user(&self, username: &str) -> Result<Option<User>, IdentityError> {
        self.repository.find_by_username(username).await
    }

    /// # Errors
    /// Storage failures.
    pub async fn user_count(&self) -> Result<usize, IdentityError> {
        self.repository.count().await
    }

    #[must_use]
    pub const fn attempts(&self) -> &LoginAttempts {
        &self.attempts
    }

    /// Publishes a `LOGIN`/`LOGOUT` audit event on behalf of `username`.
    ///
    /// A bus failure is logged and swallowed.
    pub fn audit(&self, username: &str, action: AuditAction, details: &str) {
        let username = if username.trim().is_empty() { ANONYMOUS } else { username.trim() };
        if let Err(err) = self.events.publish(AuditEvent::new(username, action, USER, details)) {
            warn!(error = %err, user = %username, %action, "Failed to publish audit event");
        }
    }
}
