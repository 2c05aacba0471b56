use axum::routing::get;
use axum::{Json, Router, middleware};
use catalog::kernel::server::{ApiState, method_not_allowed, not_found, problem_instance, system_router};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::{Components, OpenApi as OpenApiDoc};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub const DOCS_PATH: &str = "/docs";
pub const OPENAPI_PATH: &str = "/v3/api-docs";

#[derive(OpenApi)]
#[openapi(
    info(title = "Catalog API", description = "Product catalog with audit trail"),
    modifiers(&BasicAuth)
)]
struct ApiDoc;

struct BasicAuth;

impl Modify for BasicAuth {
    fn modify(&self, openapi: &mut OpenApiDoc) {
        openapi
            .components
            .get_or_insert_with(Components::new)
            .add_security_scheme("basic", SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)));
    }
}

/// Builds the complete application: feature routes, docs, fallbacks and tracing.
pub fn init(state: ApiState) -> Router {
    let (routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(system_router())
        .merge(catalog::router(&state))
        .split_for_parts();

    let spec = api_doc.clone();
    Router::new()
        .merge(routes)
        .merge(Scalar::with_url(DOCS_PATH, api_doc))
        .route(OPENAPI_PATH, get(move || std::future::ready(Json(spec.clone()))))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(problem_instance))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
