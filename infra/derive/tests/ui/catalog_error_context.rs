use catalog_derive::catalog_error;
use std::borrow::Cow;

#[catalog_error]
pub enum StoreError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing record{}: {message}", format_context(.context))]
    Missing { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), std::io::Error> {
    Err(std::io::Error::other("unreadable"))
}

fn lookup() -> Result<(), StoreError> {
    Err(StoreError::Missing { message: "product".into(), context: None })
}

fn main() {
    let err = read().context("loading seed file").unwrap_err();
    assert_eq!(err.to_string(), "IO error (loading seed file): unreadable");

    let err = lookup().context("by id").unwrap_err();
    assert_eq!(err.to_string(), "Missing record (by id): product");
}
