use catalog_database::DatabaseError;
use catalog_kernel::server::ApiError;
use std::borrow::Cow;

/// Audit slice error type.
#[catalog_derive::catalog_error]
pub enum AuditError {
    #[error("Audit storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Audit query error{}: {source}", format_context(.context))]
    Surreal { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    #[error("Corrupted audit record{}: {message}", format_context(.context))]
    Corrupted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Audit event bus error{}: {source}", format_context(.context))]
    Events { source: catalog_event_bus::EventBusError, context: Option<Cow<'static, str>> },

    #[error("Audit error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        Self::internal(err)
    }
}
