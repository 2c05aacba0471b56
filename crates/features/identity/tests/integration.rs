use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use catalog_database::Database;
use catalog_event_bus::EventBus;
use catalog_identity::{
    ACCOUNT_LOCKED, INVALID_PASSWORD, Identity, IdentityError, LOGIN_REQUIRES_CREDENTIALS,
    LOGIN_SUCCESSFUL, LoginResponse, USER_NOT_FOUND,
};
use catalog_kernel::domain::audit::{AuditAction, AuditEvent};
use catalog_kernel::domain::auth::Role;
use catalog_kernel::domain::config::{AppConfig, SecurityConfig};
use catalog_kernel::server::{ApiState, ProblemDetails};
use tower::util::ServiceExt;

async fn database(name: &str) -> Database {
    Database::builder()
        .url("mem://")
        .session("identity", name)
        .migrations(catalog_identity::migrations())
        .init()
        .await
        .expect("in-memory database")
}

async fn identity(name: &str) -> (Identity, ApiState, EventBus) {
    let db = database(name).await;
    let events = EventBus::new();
    let slice = catalog_identity::init(&SecurityConfig::default(), &db, &events).unwrap();
    let state = ApiState::builder()
        .config(AppConfig::default())
        .db(db)
        .events(events.clone())
        .register_slice(slice)
        .build()
        .unwrap();
    let identity = state.try_get_slice::<Identity>().unwrap().clone();
    catalog_identity::seed(&identity).await.unwrap();
    (identity, state, events)
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let (identity, _, _) = identity("seed").await;
    assert_eq!(identity.service.user_count().await.unwrap(), 2);
    assert_eq!(catalog_identity::seed(&identity).await.unwrap(), 0);

    let admin = identity.service.find_user("admin").await.unwrap().unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert!(admin.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn login_reports_each_outcome() {
    let (identity, _, _) = identity("login").await;
    let service = &identity.service;

    let ok = service.login("admin", "Admin123!").await.unwrap();
    assert!(ok.success);
    assert_eq!(ok.message, LOGIN_SUCCESSFUL);
    assert_eq!(ok.principal.unwrap().role, Role::Admin);

    assert_eq!(service.login("", "x").await.unwrap().message, LOGIN_REQUIRES_CREDENTIALS);
    assert_eq!(service.login("ghost", "Ghost123!").await.unwrap().message, USER_NOT_FOUND);
    assert_eq!(service.login("user", "wrong").await.unwrap().message, INVALID_PASSWORD);
}

#[tokio::test]
async fn three_failures_lock_the_account() {
    let (identity, _, _) = identity("lockout").await;
    let service = &identity.service;

    for _ in 0..3 {
        assert_eq!(service.login("user", "Wrong123!").await.unwrap().message, INVALID_PASSWORD);
    }
    let locked = service.login("user", "User123!").await.unwrap();
    assert!(locked.is_failure());
    assert_eq!(locked.message, ACCOUNT_LOCKED);

    service.attempts().reset("user");
    assert!(service.login("user", "User123!").await.unwrap().success);
}

#[tokio::test]
async fn success_resets_failures() {
    let (identity, _, _) = identity("reset").await;
    let service = &identity.service;

    service.login("user", "nope").await.unwrap();
    service.login("user", "nope").await.unwrap();
    assert!(service.login("user", "User123!").await.unwrap().success);
    assert_eq!(service.attempts().failures("user"), 0);
}

#[tokio::test]
async fn register_rejects_weak_passwords_and_duplicates() {
    let (identity, _, _) = identity("register").await;
    let service = &identity.service;

    let weak = service.register("bob", "bob", Role::User).await.unwrap_err();
    assert!(matches!(weak, IdentityError::Validation { .. }));

    let duplicate = service.register("admin", "Another123!", Role::User).await.unwrap_err();
    assert!(matches!(duplicate, IdentityError::Conflict { .. }));

    service.register("bob", "Bob12345!", Role::User).await.unwrap();
    assert!(service.login("bob", "Bob12345!").await.unwrap().success);
}

#[tokio::test]
async fn init_rejects_unquotable_realm() {
    let db = database("realm").await;
    let security = SecurityConfig { realm: "bad\"realm".into(), ..SecurityConfig::default() };
    let err = catalog_identity::init(&security, &db, &EventBus::new()).unwrap_err();
    assert!(matches!(err, IdentityError::Validation { .. }));
}

fn login_request(username: &str, password: &str) -> Request {
    let body = serde_json::json!({ "username": username, "password": password });
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn login_endpoint_answers_and_audits() {
    let (_, state, events) = identity("http-login").await;
    let mut audits = events.subscribe::<AuditEvent>().unwrap();
    let (router, _) = catalog_identity::public_router().split_for_parts();
    let app = router.with_state(state);

    let response = app.clone().oneshot(login_request("admin", "Admin123!")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: LoginResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body.username, "admin");
    assert_eq!(body.role, "ADMIN");

    let response = app.oneshot(login_request("admin", "bad")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Basic realm=\"User Visible Realm\"");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let problem: ProblemDetails = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(problem.detail, INVALID_PASSWORD);

    let first = audits.try_recv().unwrap();
    assert_eq!((first.action, first.details.as_str()), (AuditAction::Login, LOGIN_SUCCESSFUL));
    let second = audits.try_recv().unwrap();
    assert_eq!((second.username.as_str(), second.details.as_str()), ("admin", INVALID_PASSWORD));
}

fn logout_request(authorization: Option<&str>) -> Request {
    let mut builder = Request::builder().method("POST").uri("/auth/logout");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn problem_detail(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice::<ProblemDetails>(&bytes).unwrap().detail
}

#[tokio::test]
async fn middleware_guards_protected_routes() {
    let (_, state, events) = identity("http-guard").await;
    let mut audits = events.subscribe::<AuditEvent>().unwrap();
    let (router, _) = catalog_identity::router().split_for_parts();
    let app = router
        .layer(middleware::from_fn_with_state(state.clone(), catalog_identity::authenticate))
        .with_state(state);

    let response = app.clone().oneshot(logout_request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(problem_detail(response).await, "Missing or invalid Authorization header");

    let response = app.clone().oneshot(logout_request(Some("Basic %%%"))).await.unwrap();
    assert_eq!(problem_detail(response).await, "Invalid Base64 encoding in credentials");

    let no_colon = format!("Basic {}", STANDARD.encode("admin"));
    let response = app.clone().oneshot(logout_request(Some(&no_colon))).await.unwrap();
    assert_eq!(problem_detail(response).await, "Invalid credential format");

    let unknown = format!("Basic {}", STANDARD.encode("ghost:Ghost123!"));
    let response = app.clone().oneshot(logout_request(Some(&unknown))).await.unwrap();
    assert_eq!(problem_detail(response).await, USER_NOT_FOUND);
    let failed = audits.try_recv().unwrap();
    assert_eq!((failed.username.as_str(), failed.action), ("ghost", AuditAction::Login));

    let valid = format!("Basic {}", STANDARD.encode("user:User123!"));
    let response = app.oneshot(logout_request(Some(&valid))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let logout = audits.try_recv().unwrap();
    assert_eq!((logout.username.as_str(), logout.action), ("user", AuditAction::Logout));
    assert_eq!(logout.details, "Logout successful");
}
