#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use kitcheck_api::auth::jwt::JwtConfig;
use kitcheck_api::config::{DetectorConfig, LogFormat, ServerConfig};
use kitcheck_api::router::build_app_router;
use kitcheck_api::state::AppState;
use kitcheck_core::catalog::{Catalog, DEFAULT_CLASSES};
use kitcheck_core::detector::DetectorAdapter;
use kitcheck_core::store::memory::MemoryStore;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        app_name: "Kit Check Test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8080".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expires_seconds: 3600,
        },
        classes: DEFAULT_CLASSES.iter().map(|c| c.to_string()).collect(),
        detector: DetectorConfig {
            enabled: false,
            endpoint: None,
            confidence: 0.25,
            timeout_secs: 1,
        },
        log_format: LogFormat::Pretty,
    }
}

/// Full application router on the in-memory store with the stub detector.
///
/// Same middleware stack as production.
pub fn build_test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        test_config(),
        store.clone(),
        store,
        DetectorAdapter::stub_only(Catalog::default()),
        None,
    );
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should not fail")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

// ---------------------------------------------------------------------------
// Domain helpers
// ---------------------------------------------------------------------------

/// Register a user and return a bearer token for it.
pub async fn register_and_login(app: &Router, employee_id: &str, role: &str) -> String {
    let response = post_json(
        app.clone(),
        "/auth/register",
        json!({ "employee_id": employee_id, "password": "secret-pw", "role": role }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app.clone(),
        "/auth/login",
        json!({ "employee_id": employee_id, "password": "secret-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string()
}

/// One annotation per default class, all with the same valid box.
pub fn full_kit() -> Value {
    let annotations: Vec<Value> = DEFAULT_CLASSES
        .iter()
        .map(|c| json!({ "class": c, "box": [0.5, 0.5, 0.2, 0.1], "source": "manual" }))
        .collect();
    json!({ "annotations": annotations })
}

/// Create a handout session and return its id.
pub async fn create_session(app: &Router, token: &str) -> String {
    let response = post_json_auth(
        app.clone(),
        "/sessions/handout",
        json!({ "threshold": 0.98, "notes": "bay 3" }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["session_id"]
        .as_str()
        .expect("session_id should be a string")
        .to_string()
}
