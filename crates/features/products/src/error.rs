use catalog_database::DatabaseError;
use catalog_kernel::domain::constants::PRODUCT;
use catalog_kernel::server::{ApiError, FieldError};
use std::borrow::Cow;
use tracing::warn;

/// Products slice error type.
#[catalog_derive::catalog_error]
pub enum ProductError {
    #[error("Product storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Product query error{}: {source}", format_context(.context))]
    Surreal { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    #[error("Product not found: {id}")]
    NotFound { id: String },

    #[error("Admin role required for this operation (user {username})")]
    AccessDenied { username: String },

    #[error("Invalid product: {errors:?}")]
    InvalidArguments { errors: Vec<FieldError> },

    #[error("Corrupted product record{}: {message}", format_context(.context))]
    Corrupted { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal product error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound { id } => Self::not_found(PRODUCT, &id),
            ProductError::AccessDenied { username } => {
                warn!(user = %username, "Admin role required for this operation");
                Self::access_denied()
            },
            ProductError::InvalidArguments { errors } => Self::invalid_arguments(&errors),
            err => Self::internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn maps_to_problem_statuses() {
        let not_found = ApiError::from(ProductError::NotFound { id: "p1".into() });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.detail(), "Resource [product] not found by id: [p1]");

        let denied = ApiError::from(ProductError::AccessDenied { username: "user".into() });
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
        assert_eq!(denied.detail(), "ask administrator for additional details");

        let internal = ApiError::from(ProductError::from("disk on fire"));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!internal.detail().contains("fire"));
    }
}
