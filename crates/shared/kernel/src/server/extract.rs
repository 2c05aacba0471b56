//! Extractors whose rejections are problem details.

use super::error::{ApiError, FieldError};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

/// Structural checks run on a deserialized request body.
pub trait Validate {
    /// Returns every violated rule, or an empty vector.
    fn validate(&self) -> Vec<FieldError>;
}

/// JSON body that passed [`Validate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(json_rejection)?;
        let errors = value.validate();
        if errors.is_empty() { Ok(Self(value)) } else { Err(ApiError::invalid_arguments(&errors)) }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::validation(rejection.body_text())
}

/// Query string extractor reporting parse failures as `incorrect_parameter_type`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection: QueryRejection| parameter_rejection(rejection.body_text()))
    }
}

/// Path extractor reporting parse failures as `incorrect_parameter_type`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection: PathRejection| parameter_rejection(rejection.body_text()))
    }
}

/// `missing_parameter` when serde names an absent field, `incorrect_parameter_type` otherwise.
fn parameter_rejection(text: String) -> ApiError {
    if let Some(name) = missing_field(&text) {
        return ApiError::missing_parameter(name);
    }
    ApiError::parameter_type(text)
}

fn missing_field(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("missing field `")?;
    rest.split_once('`').map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_named() {
        let error = parameter_rejection("Failed to deserialize query string: missing field `username`".into());
        assert_eq!(error.title(), "missing_parameter");
        assert_eq!(error.detail(), "Required parameter [username] is missing");

        let error = parameter_rejection("Failed to deserialize query string: max: invalid digit".into());
        assert_eq!(error.title(), "incorrect_parameter_type");
    }
}
