use catalog_database::DatabaseError;
use catalog_kernel::server::ApiError;
use std::borrow::Cow;

/// Identity slice error type.
#[catalog_derive::catalog_error]
pub enum IdentityError {
    #[error("User storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("User query error{}: {source}", format_context(.context))]
    Surreal { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    /// Rejected password or username on registration.
    #[error("Invalid user{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("User already exists{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Hashing failed or a stored row cannot be read back.
    #[error("Password hashing error{}: {message}", format_context(.context))]
    Hashing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Password worker failed{}: {source}", format_context(.context))]
    Blocking { source: tokio::task::JoinError, context: Option<Cow<'static, str>> },

    #[error("Corrupted user record{}: {message}", format_context(.context))]
    Corrupted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Identity event bus error{}: {source}", format_context(.context))]
    Events { source: catalog_event_bus::EventBusError, context: Option<Cow<'static, str>> },

    #[error("Internal identity error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Validation { message, .. } => Self::validation(message),
            err => Self::internal(err),
        }
    }
}
