//! Password hashing and complexity rules.

use crate::error::IdentityError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

pub const MIN_LENGTH: usize = 8;

pub const TOO_SHORT: &str = "Password must be at least 8 characters long";
pub const NO_UPPERCASE: &str = "Password must contain at least one uppercase letter";
pub const NO_LOWERCASE: &str = "Password must contain at least one lowercase letter";
pub const NO_DIGIT: &str = "Password must contain at least one digit";
pub const NO_SPECIAL: &str = "Password must contain at least one special character";

/// Every rule `password` breaks, in a stable order. Empty when it is acceptable.
#[must_use]
pub fn validate_complexity(password: &str) -> Vec<&'static str> {
    let mut violations = Vec::new();
    if password.chars().count() < MIN_LENGTH {
        violations.push(TOO_SHORT);
    }

    let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);
    for c in password.chars() {
        if c.is_uppercase() {
            upper = true;
        } else if c.is_lowercase() {
            lower = true;
        } else if c.is_numeric() {
            digit = true;
        } else if !c.is_alphanumeric() {
            special = true;
        }
    }

    for (ok, message) in
        [(upper, NO_UPPERCASE), (lower, NO_LOWERCASE), (digit, NO_DIGIT), (special, NO_SPECIAL)]
    {
        if !ok {
            violations.push(message);
        }
    }
    violations
}

/// Hashes a password that satisfies [`validate_complexity`] into a PHC string.
///
/// # Errors
/// `Validation` listing the broken rules, or `Hashing` if argon2 fails.
pub fn hash(password: &str) -> Result<String, IdentityError> {
    let violations = validate_complexity(password);
    if !violations.is_empty() {
        return Err(IdentityError::Validation {
            message: violations.join(", ").into(),
            context: Some("password".into()),
        });
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Hashing { message: e.to_string().into(), context: None })
}

/// `false` for a wrong password and for a hash that does not parse.
#[must_use]
pub fn verify(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// [`hash`] on the blocking pool.
///
/// # Errors
/// As [`hash`], plus `Blocking` when the worker panics.
pub async fn hash_blocking(password: &str) -> Result<String, IdentityError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash(&password)).await?
}

/// [`verify`] on the blocking pool.
///
/// # Errors
/// `Blocking` when the worker panics.
pub async fn verify_blocking(password: &str, stored: &str) -> Result<bool, IdentityError> {
    let (password, stored) = (password.to_owned(), stored.to_owned());
    Ok(tokio::task::spawn_blocking(move || verify(&password, &stored)).await?)
}
