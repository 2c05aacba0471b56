use std::borrow::Cow;

/// Errors raised by the event bus.
#[catalog_derive::catalog_error]
pub enum EventBusError {
    /// The registered channel carries a different payload type.
    /// Indicates a broken invariant in the type registry.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Bounded channels need room for at least one event.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
