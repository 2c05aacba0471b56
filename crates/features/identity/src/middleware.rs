//! HTTP Basic authentication for protected routes.

use crate::Identity;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use catalog_kernel::domain::audit::AuditAction;
use catalog_kernel::server::{ApiError, ApiState};
use tracing::debug;

const BASIC_PREFIX: &str = "Basic ";

pub const MISSING_HEADER: &str = "Missing or invalid Authorization header";
pub const INVALID_BASE64: &str = "Invalid Base64 encoding in credentials";
pub const INVALID_FORMAT: &str = "Invalid credential format";

/// Rejected `Authorization` header, before any password check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    Missing,
    Base64,
    Format,
}

impl CredentialsError {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Missing => MISSING_HEADER,
            Self::Base64 => INVALID_BASE64,
            Self::Format => INVALID_FORMAT,
        }
    }
}

/// Splits `Basic base64(user:pass)` into username and password.
///
/// The password may itself contain `:`.
///
/// # Errors
/// One [`CredentialsError`] per malformed layer.
pub fn parse_basic(header: Option<&str>) -> Result<(String, String), CredentialsError> {
    let encoded = header
        .and_then(|value| value.strip_prefix(BASIC_PREFIX))
        .ok_or(CredentialsError::Missing)?;
    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| CredentialsError::Base64)?;
    let credentials = String::from_utf8_lossy(&decoded);
    let (username, password) = credentials.split_once(':').ok_or(CredentialsError::Format)?;
    Ok((username.to_owned(), password.to_owned()))
}

/// Authenticates every request and stores the caller's
/// [`Principal`](catalog_kernel::domain::auth::Principal) in the request extensions.
///
/// Rejected logins are audited as `LOGIN` events.
pub async fn authenticate(
    State(state): State<ApiState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = state.try_get_slice::<Identity>().map_err(ApiError::internal)?;
    let header = request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok());

    let (username, password) =
        parse_basic(header).map_err(|e| ApiError::unauthorized(e.message(), identity.realm()))?;

    let result = identity.service.login(&username, &password).await?;
    let Some(principal) = result.principal else {
        identity.service.audit(&username, AuditAction::Login, &result.message);
        return Err(ApiError::unauthorized(result.message, identity.realm()));
    };

    debug!(user = %principal.username, path = %request.uri().path(), "Request authenticated");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn parses_username_and_password() {
        let header = basic("admin:Admin123!");
        assert_eq!(parse_basic(Some(&header)), Ok(("admin".into(), "Admin123!".into())));
    }

    #[test]
    fn password_keeps_extra_colons() {
        let header = basic("user:pa:ss");
        assert_eq!(parse_basic(Some(&header)).unwrap().1, "pa:ss");
    }

    #[test]
    fn each_malformed_layer_has_its_error() {
        assert_eq!(parse_basic(None), Err(CredentialsError::Missing));
        assert_eq!(parse_basic(Some("Bearer abc")), Err(CredentialsError::Missing));
        assert_eq!(parse_basic(Some("Basic @@@")), Err(CredentialsError::Base64));
        assert_eq!(parse_basic(Some(&basic("no-colon"))), Err(CredentialsError::Format));
    }
}
