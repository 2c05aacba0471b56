//! RFC 9457 problem details for every failed request.

use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_derive::api_model;
use std::borrow::Cow;
use std::fmt;
use tracing::{error, warn};

pub const PROBLEM_JSON: &str = "application/problem+json";
const ABOUT_BLANK: &str = "about:blank";
const INTERNAL_DETAIL: &str =
    "Application experiencing problems, if error repeats, please report to developer team";

/// Body of an error response.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, Eq)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// A request failure rendered as `application/problem+json`.
///
/// Slices convert their own error enums into this type at the HTTP edge.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    title: &'static str,
    detail: Cow<'static, str>,
    challenge: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: impl Into<Cow<'static, str>>) -> Self {
        Self { status, title, detail: detail.into(), challenge: None }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "resource_not_found",
            format!("Resource [{resource}] not found by id: [{id}]"),
        )
    }

    pub fn no_route(path: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "resource_does_not_exist",
            format!("Resource does not exist for path {path}"),
        )
    }

    /// Field level failures, rendered as `wrong argument [field:msg],...`.
    pub fn invalid_arguments<'a, I>(errors: I) -> Self
    where
        I: IntoIterator<Item = &'a FieldError>,
    {
        let joined = errors.into_iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        Self::new(
            StatusCode::BAD_REQUEST,
            "incorrect_method_parameter_value",
            format!("wrong argument {joined}"),
        )
    }

    pub fn validation(message: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "incorrect_parameter_value",
            format!("Validation fail [{message}]"),
        )
    }

    pub fn missing_parameter(name: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "missing_parameter",
            format!("Required parameter [{name}] is missing"),
        )
    }

    pub fn parameter_type(message: impl fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "incorrect_parameter_type", message.to_string())
    }

    /// 401 with a `WWW-Authenticate: Basic` challenge for `realm`.
    pub fn unauthorized(message: impl Into<Cow<'static, str>>, realm: &str) -> Self {
        Self {
            challenge: Some(format!("Basic realm=\"{realm}\"")),
            ..Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
        }
    }

    pub fn access_denied() -> Self {
        Self::new(StatusCode::FORBIDDEN, "access_denied", "ask administrator for additional details")
    }

    pub fn method_not_allowed(method: &Method) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            format!("Method [{method}] is not supported"),
        )
    }

    /// Logs `cause` and hides it from the client.
    pub fn internal(cause: impl fmt::Display) -> Self {
        error!(%cause, "Unexpected error happened");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_app_fail", INTERNAL_DETAIL)
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.title
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub fn to_problem(&self, instance: Option<String>) -> ProblemDetails {
        ProblemDetails {
            problem_type: ABOUT_BLANK.to_owned(),
            title: self.title.to_owned(),
            status: self.status.as_u16(),
            detail: self.detail.to_string(),
            instance,
        }
    }

    fn render(&self, instance: Option<String>) -> Response {
        let mut response = (self.status, Json(self.to_problem(instance))).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        if let Some(challenge) = self.challenge.as_deref()
            && let Ok(value) = HeaderValue::from_str(challenge)
        {
            headers.insert(header::WWW_AUTHENTICATE, value);
        }
        response
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.title, self.detail)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(title = self.title, detail = %self.detail, "Request failed");
        } else {
            warn!(status = self.status.as_u16(), title = self.title, detail = %self.detail, "Request rejected");
        }

        let mut response = self.render(None);
        response.extensions_mut().insert(self);
        response
    }
}

/// Middleware filling `instance` with the request path on problem responses.
pub async fn problem_instance(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;
    match response.extensions().get::<ApiError>() {
        Some(problem) => problem.render(Some(path)),
        None => response,
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: Cow<'static, str>,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self { field, message: message.into() }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.field, self.message)
    }
}
