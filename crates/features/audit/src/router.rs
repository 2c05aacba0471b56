use crate::Audit;
use crate::model::AuditLogDto;
use axum::Json;
use axum::extract::State;
use catalog_derive::{api_handler, api_model};
use catalog_kernel::security::CurrentUser;
use catalog_kernel::server::{ApiError, ApiQuery, ApiState, ProblemDetails};
use tracing::debug;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const AUDIT_TAG: &str = "Audit";

#[api_model(params = true, deny_unknown_fields = false)]
#[derive(Default)]
pub struct AuditQuery {
    /// Only entries of this user
    pub username: Option<String>,
}

#[api_handler(
    get,
    path = "/audits",
    params(AuditQuery),
    responses(
        (status = OK, description = "Audit trail, oldest first", body = Vec<AuditLogDto>),
        (status = UNAUTHORIZED, description = "Missing or invalid credentials", body = ProblemDetails),
    ),
    security(("basic" = [])),
    tag = AUDIT_TAG,
)]
pub(crate) async fn list_audits(
    State(state): State<ApiState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<AuditQuery>,
) -> Result<Json<Vec<AuditLogDto>>, ApiError> {
    let audit = state.try_get_slice::<Audit>().map_err(ApiError::internal)?;
    let username = query.username.as_deref().map(str::trim).filter(|u| !u.is_empty());
    debug!(caller = %user.username, filter = ?username, "Listing audit entries");

    let entries = match username {
        Some(username) => audit.service.find_by_username(username).await?,
        None => audit.service.find_all().await?,
    };

    Ok(Json(entries.into_iter().map(AuditLogDto::from).collect()))
}

/// Audit routes. They expect the authentication middleware in front of them.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(list_audits))
}
