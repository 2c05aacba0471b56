use super::SYSTEM_TAG;
use super::state::ApiState;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::{Json, response::IntoResponse};
use catalog_derive::{api_handler, api_model};
use tracing::warn;

const UP: &str = "UP";
const DOWN: &str = "DOWN";

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct HealthResponse {
    /// `UP` when every dependency answers, `DOWN` otherwise
    pub status: String,
    pub version: String,
    /// Status of the database connection
    pub database: String,
    /// Registered feature slices, sorted
    pub slices: Vec<String>,
}

#[api_handler(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service and database are up", body = HealthResponse),
        (status = SERVICE_UNAVAILABLE, description = "Database does not answer", body = HealthResponse),
    ),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let database_up = match state.database.health().await {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "Database health check failed");
            false
        },
    };

    let mut slices: Vec<String> = state.slice_names().map(str::to_owned).collect();
    slices.sort_unstable();

    let (code, status) = if database_up { (StatusCode::OK, UP) } else { (StatusCode::SERVICE_UNAVAILABLE, DOWN) };
    let body = HealthResponse {
        status: status.to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        database: status.to_owned(),
        slices,
    };

    (code, [(header::CACHE_CONTROL, "no-store")], Json(body))
}
