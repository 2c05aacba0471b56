use std::borrow::Cow;

/// Errors raised by the database connector.
#[catalog_derive::catalog_error]
pub enum DatabaseError {
    /// Invalid builder input.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The engine could not be reached or stayed unhealthy.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Root credentials were rejected.
    #[error("Authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Errors reported by the `SurrealDB` SDK or a failing statement.
    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A migration failed or an applied script was modified.
    #[error("Migration error{}: {message}", format_context(.context))]
    Migration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
