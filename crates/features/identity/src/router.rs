use crate::Identity;
use crate::model::{LoginRequest, LoginResponse};
use crate::service::LOGOUT_SUCCESSFUL;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use catalog_derive::api_handler;
use catalog_kernel::domain::audit::AuditAction;
use catalog_kernel::security::CurrentUser;
use catalog_kernel::server::{ApiError, ApiState, ProblemDetails, ValidatedJson};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const AUTH_TAG: &str = "Auth";

#[api_handler(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = OK, description = "Credentials accepted", body = LoginResponse),
        (status = BAD_REQUEST, description = "Malformed body", body = ProblemDetails),
        (status = UNAUTHORIZED, description = "Credentials rejected", body = ProblemDetails),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn login(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let identity = state.try_get_slice::<Identity>().map_err(ApiError::internal)?;
    let result = identity.service.login(&request.username, &request.password).await?;
    identity.service.audit(&request.username, AuditAction::Login, &result.message);

    match result.principal {
        Some(principal) => Ok(Json(LoginResponse::new(&principal, &result.message))),
        None => Err(ApiError::unauthorized(result.message, identity.realm())),
    }
}

#[api_handler(
    post,
    path = "/auth/logout",
    responses(
        (status = NO_CONTENT, description = "Logged out"),
        (status = UNAUTHORIZED, description = "Missing or invalid credentials", body = ProblemDetails),
    ),
    security(("basic" = [])),
    tag = AUTH_TAG,
)]
pub(crate) async fn logout(
    State(state): State<ApiState>,
    user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let identity = state.try_get_slice::<Identity>().map_err(ApiError::internal)?;
    identity.service.audit(&user.username, AuditAction::Logout, LOGOUT_SUCCESSFUL);
    Ok(StatusCode::NO_CONTENT)
}

/// Routes reachable without credentials.
pub fn public_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(login))
}

/// Routes that expect the authentication middleware in front of them.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(logout))
}
