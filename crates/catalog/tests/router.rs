use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use catalog::domain::config::{AppConfig, AppConfigInner, SeedConfig};
use catalog::features::{audit, identity, products};
use catalog::kernel::server::{ApiState, ProblemDetails};
use catalog_database::Database;
use catalog_event_bus::EventBus;
use std::time::Duration;
use tower::util::ServiceExt;

async fn state(name: &str, seed: bool) -> ApiState {
    let db = Database::builder()
        .url("mem://")
        .session("catalog", name)
        .migrations(catalog::migrations())
        .init()
        .await
        .expect("in-memory database");
    let events = EventBus::new();
    let config = AppConfig::from(AppConfigInner { seed: SeedConfig { enabled: seed }, ..Default::default() });

    let builder = ApiState::builder().config(config.clone()).db(db.clone()).events(events.clone());
    let state = catalog::init(builder, &config, &db, &events).unwrap().build().unwrap();
    catalog::seed(&state).await.unwrap();
    state
}

fn app(state: &ApiState) -> Router {
    let (router, _) = catalog::router(state).split_for_parts();
    router.with_state(state.clone())
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn get(uri: &str, credentials: Option<(&str, &str)>) -> Request {
    let builder = Request::builder().uri(uri);
    let builder = match credentials {
        Some((username, password)) => builder.header(header::AUTHORIZATION, basic(username, password)),
        None => builder,
    };
    builder.body(Body::empty()).unwrap()
}

async fn json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn modules_are_listed_in_initialization_order() {
    assert_eq!(catalog::MODULES, ["audit", "identity", "products"]);
}

#[test]
fn migrations_cover_every_slice() {
    let modules: Vec<_> = catalog::migrations().iter().map(|m| m.module).collect();
    assert_eq!(modules, ["audit", "identity", "products"]);
}

#[tokio::test]
async fn init_registers_every_slice() {
    let state = state("slices", false).await;
    assert!(state.get_slice::<audit::Audit>().is_some());
    assert!(state.get_slice::<identity::Identity>().is_some());
    assert!(state.get_slice::<products::Products>().is_some());
}

#[tokio::test]
async fn seed_respects_the_switch() {
    let off = state("seed-off", false).await;
    let identity = off.try_get_slice::<identity::Identity>().unwrap();
    assert_eq!(identity.service.user_count().await.unwrap(), 0);

    let on = state("seed-on", true).await;
    let identity = on.try_get_slice::<identity::Identity>().unwrap();
    let products = on.try_get_slice::<products::Products>().unwrap();
    assert_eq!(identity.service.user_count().await.unwrap(), 2);
    assert_eq!(products.service.count().await.unwrap(), 8);

    catalog::seed(&on).await.unwrap();
    assert_eq!(products.service.count().await.unwrap(), 8);
}

#[tokio::test]
async fn protected_routes_need_credentials() {
    let state = state("guard", true).await;
    let app = app(&state);

    let response = app.clone().oneshot(get("/products", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert_eq!(json::<ProblemDetails>(response).await.title, "unauthorized");

    let response = app.clone().oneshot(get("/audits", Some(("user", "wrong")))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.oneshot(get("/products", Some(("user", "User123!")))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json::<Vec<products::ProductDto>>(response).await.len(), 8);
}

#[tokio::test]
async fn login_is_public() {
    let state = state("public", true).await;
    let body = serde_json::json!({ "username": "admin", "password": "Admin123!" });
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app(&state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login: identity::LoginResponse = json(response).await;
    assert_eq!(login.username, "admin");
}

#[tokio::test]
async fn audit_trail_records_seeded_products() {
    let state = state("trail", true).await;
    let app = app(&state);

    let mut entries = Vec::new();
    for _ in 0..50 {
        let response = app.clone().oneshot(get("/audits?username=admin", Some(("admin", "Admin123!")))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        entries = json::<Vec<audit::AuditLogDto>>(response).await;
        if entries.len() >= 8 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(entries.len(), 8);
    assert!(entries.iter().all(|e| e.username == "admin"));
}
