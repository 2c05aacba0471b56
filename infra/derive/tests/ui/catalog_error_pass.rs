use catalog_derive::catalog_error;
use std::borrow::Cow;

#[catalog_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let from_str: DemoError = "boom".into();
    assert!(matches!(from_str, DemoError::Internal { .. }));

    let io = std::io::Error::other("disk");
    let wrapped: DemoError = io.into();
    assert!(matches!(wrapped, DemoError::Io { context: None, .. }));
}
