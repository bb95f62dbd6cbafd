//! HTTP-level integration tests for registration, login and `/auth/me`.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, register_and_login};
use serde_json::json;

#[tokio::test]
async fn test_register_returns_created_user() {
    let app = common::build_test_app();
    let response = post_json(
        app,
        "/auth/register",
        json!({ "employee_id": "E1001", "password": "1234" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["employee_id"], "E1001");
    assert_eq!(json["role"], "simple");
    assert!(json["user_id"].is_string());
    assert!(json["created_at"].is_string());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = common::build_test_app();
    let body = json!({ "employee_id": "E1001", "password": "1234" });
    let first = post_json(app.clone(), "/auth/register", body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json(app, "/auth/register", body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validates_lengths_and_role() {
    let app = common::build_test_app();

    let short_id = post_json(
        app.clone(),
        "/auth/register",
        json!({ "employee_id": "E1", "password": "1234" }),
    )
    .await;
    assert_eq!(short_id.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let short_pw = post_json(
        app.clone(),
        "/auth/register",
        json!({ "employee_id": "E1002", "password": "123" }),
    )
    .await;
    assert_eq!(short_pw.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bad_role = post_json(
        app,
        "/auth/register",
        json!({ "employee_id": "E1003", "password": "1234", "role": "root" }),
    )
    .await;
    assert_eq!(bad_role.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_returns_bearer_token() {
    let app = common::build_test_app();
    post_json(
        app.clone(),
        "/auth/register",
        json!({ "employee_id": "E2001", "password": "pass1" }),
    )
    .await;

    let response = post_json(
        app,
        "/auth/login",
        json!({ "employee_id": "E2001", "password": "pass1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["token_type"], "Bearer");
    assert_eq!(json["expires_in"], 3600);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = common::build_test_app();
    post_json(
        app.clone(),
        "/auth/register",
        json!({ "employee_id": "E3001", "password": "right" }),
    )
    .await;

    let wrong_pw = post_json(
        app.clone(),
        "/auth/login",
        json!({ "employee_id": "E3001", "password": "wrong" }),
    )
    .await;
    let unknown = post_json(
        app,
        "/auth/login",
        json!({ "employee_id": "ghost", "password": "whatever" }),
    )
    .await;

    assert_eq!(wrong_pw.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_pw).await, body_json(unknown).await);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = common::build_test_app();
    let token = register_and_login(&app, "E4001", "admin").await;

    let response = get_auth(app, "/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["employee_id"], "E4001");
    assert_eq!(json["role"], "admin");
}

#[tokio::test]
async fn test_me_rejects_missing_and_bad_tokens() {
    let app = common::build_test_app();

    let missing = get(app.clone(), "/auth/me").await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let garbage = get_auth(app, "/auth/me", "not-a-jwt").await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(garbage).await["error"], "invalid credentials");
}

#[tokio::test]
async fn test_token_for_unknown_user_is_rejected() {
    // Same secret, different store: the subject does not exist here.
    let issuer = common::build_test_app();
    let token = register_and_login(&issuer, "E5001", "simple").await;

    let other = common::build_test_app();
    let response = get_auth(other, "/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
