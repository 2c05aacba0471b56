use super::error::ApiError;
use super::health;
use super::state::ApiState;
use axum::http::{Method, Uri};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Infrastructure endpoints, reachable without credentials.
pub fn system_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(health::health_handler))
}

/// Fallback for unknown paths.
#[allow(clippy::unused_async)]
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::no_route(uri.path())
}

/// Fallback for known paths hit with an unsupported method.
#[allow(clippy::unused_async)]
pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(&method)
}
