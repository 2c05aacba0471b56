use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::routing::{get, post};
use axum::{Router, middleware};
use catalog_database::Database;
use catalog_kernel::domain::auth::{Principal, Role};
use catalog_kernel::domain::config::AppConfig;
use catalog_kernel::registry::InitializedSlice;
use catalog_kernel::security::CurrentUser;
use catalog_kernel::server::{
    ApiQuery, ApiState, ApiStateError, FieldError, HealthResponse, PROBLEM_JSON, ProblemDetails, Validate,
    ValidatedJson, method_not_allowed, not_found, problem_instance, system_router,
};
use serde::Deserialize;
use tower::util::ServiceExt;

#[derive(Debug, Deserialize)]
struct Form {
    name: String,
}

impl Validate for Form {
    fn validate(&self) -> Vec<FieldError> {
        if self.name.trim().is_empty() {
            vec![FieldError::new("name", "name can not be null/empty")]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct Limits {
    max: Option<u32>,
}

async fn create(ValidatedJson(form): ValidatedJson<Form>) -> String {
    form.name
}

async fn limits(ApiQuery(limits): ApiQuery<Limits>) -> String {
    limits.max.unwrap_or_default().to_string()
}

#[derive(Debug, Deserialize)]
struct Lookup {
    username: String,
}

async fn lookup(ApiQuery(lookup): ApiQuery<Lookup>) -> String {
    lookup.username
}

async fn whoami(user: CurrentUser) -> String {
    user.username.clone()
}

fn app() -> Router {
    Router::new()
        .route("/items", post(create))
        .route("/limits", get(limits))
        .route("/lookup", get(lookup))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(problem_instance))
}

async fn problem(response: axum::response::Response) -> ProblemDetails {
    assert_eq!(response.headers()[header::CONTENT_TYPE], PROBLEM_JSON);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

#[tokio::test]
async fn validated_json_reports_field_errors() {
    let response = app().oneshot(json_post("/items", r#"{"name":"  "}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = problem(response).await;
    assert_eq!(body.title, "incorrect_method_parameter_value");
    assert_eq!(body.detail, "wrong argument [name:name can not be null/empty]");
    assert_eq!(body.instance.as_deref(), Some("/items"));
}

#[tokio::test]
async fn malformed_json_is_a_validation_failure() {
    let response = app().oneshot(json_post("/items", "not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(problem(response).await.title, "incorrect_parameter_value");
}

#[tokio::test]
async fn bad_query_value_is_a_type_error() {
    let request = Request::builder().uri("/limits?max=abc").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(problem(response).await.title, "incorrect_parameter_type");

    let request = Request::builder().uri("/limits?max=5").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn absent_query_parameter_is_reported_by_name() {
    let request = Request::builder().uri("/lookup?other=1").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = problem(response).await;
    assert_eq!(body.title, "missing_parameter");
    assert_eq!(body.detail, "Required parameter [username] is missing");

    let request = Request::builder().uri("/lookup?username=admin").body(Body::empty()).unwrap();
    assert_eq!(app().oneshot(request).await.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn fallbacks_render_problems() {
    let request = Request::builder().uri("/nowhere").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(problem(response).await.detail, "Resource does not exist for path /nowhere");

    let request = Request::builder().method("DELETE").uri("/items").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(problem(response).await.detail, "Method [DELETE] is not supported");
}

#[tokio::test]
async fn current_user_requires_a_principal() {
    let mut config = AppConfig::default();
    config.security.realm = "Kernel Realm".to_owned();
    let db = Database::builder().url("mem://").session("kernel", "whoami").init().await.unwrap();
    let state = ApiState::builder().config(config).db(db).build().unwrap();
    let app = Router::new().route("/whoami", get(whoami)).with_state(state);

    let request = Request::builder().uri("/whoami").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Basic realm=\"Kernel Realm\"");

    let mut request = Request::builder().uri("/whoami").body(Body::empty()).unwrap();
    request.extensions_mut().insert(Principal::new("admin", Role::Admin));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"admin");
}

#[tokio::test]
async fn health_reports_database_and_slices() {
    let db = Database::builder().url("mem://").session("kernel", "health").init().await.unwrap();
    let state = ApiState::builder().config(AppConfig::default()).db(db).build().unwrap();
    let (router, _) = system_router().split_for_parts();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router.with_state(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.status, "UP");
    assert_eq!(body.database, "UP");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    assert!(body.slices.is_empty());
}

#[derive(Debug)]
struct Unregistered;

impl catalog_kernel::registry::FeatureSlice for Unregistered {
    fn name(&self) -> &'static str {
        "Unregistered"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[tokio::test]
async fn state_requires_database_and_reports_missing_slices() {
    let err = ApiState::builder().config(AppConfig::default()).build().unwrap_err();
    assert!(matches!(err, ApiStateError::Validation { .. }));

    let db = Database::builder().url("mem://").session("kernel", "state").init().await.unwrap();
    let state = ApiState::builder().config(AppConfig::default()).db(db).build().unwrap();
    let err = state.try_get_slice::<Unregistered>().unwrap_err();
    assert!(matches!(err, ApiStateError::SliceMissing { .. }));
    assert_eq!(state.slice_names().count(), 0);
}

#[tokio::test]
async fn state_rejects_a_slice_registered_twice() {
    let db = Database::builder().url("mem://").session("kernel", "twice").init().await.unwrap();
    let err = ApiState::builder()
        .config(AppConfig::default())
        .db(db)
        .register_slices([InitializedSlice::new(Unregistered), InitializedSlice::new(Unregistered)])
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "State validation error: slice Unregistered registered twice");
}
