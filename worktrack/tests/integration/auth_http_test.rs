// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Auth Endpoint Integration Tests
//!
//! The register / login / logout surface through the real router, driven
//! with `tower::ServiceExt::oneshot`. Covers scenario S6 and the
//! indistinguishability requirement for credential failures.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use worktrack::presentation::router;

use crate::common::test_state;

async fn post_json(app: axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn register_body(username: &str) -> Value {
    json!({
        "username": username,
        "password": "Secret@123",
        "email": format!("{username}@example.com"),
        "name": "Alice Example",
    })
}

#[tokio::test]
async fn test_register_login_flow() {
    // S6 end to end.
    let state = test_state().await;
    let app = router(state);

    let (status, body) = post_json(app.clone(), "/auth/register", register_body("alice")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["errorCode"], 0);
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let (status, body) = post_json(
        app.clone(),
        "/auth/login",
        json!({"username": "alice", "password": "Secret@123"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    // Wrong password and unknown user: identical status, code, and message.
    let (wrong_status, wrong_body) = post_json(
        app.clone(),
        "/auth/login",
        json!({"username": "alice", "password": "x"}),
    )
    .await;
    let (absent_status, absent_body) = post_json(
        app.clone(),
        "/auth/login",
        json!({"username": "bob", "password": "Secret@123"}),
    )
    .await;
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(absent_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["errorCode"], absent_body["errorCode"]);
    assert_eq!(wrong_body["errorMessage"], absent_body["errorMessage"]);

    // The token works on the action endpoint.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/do")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::from(json!({"action": "label.list", "data": {}}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = post_json(app, "/auth/logout", json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let state = test_state().await;
    let app = router(state);

    let (status, _) = post_json(app.clone(), "/auth/register", register_body("alice")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(app.clone(), "/auth/register", register_body("alice")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errorCode"], 3002);

    // Same email under a new username also conflicts.
    let mut same_email = register_body("carol");
    same_email["email"] = json!("alice@example.com");
    let (status, _) = post_json(app, "/auth/register", same_email).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_validation() {
    let state = test_state().await;
    let app = router(state);

    // Short password.
    let mut short = register_body("alice");
    short["password"] = json!("short");
    let (status, body) = post_json(app.clone(), "/auth/register", short).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], 1003);

    // Bad email shape.
    let mut bad_email = register_body("alice");
    bad_email["email"] = json!("not-an-email");
    let (status, _) = post_json(app.clone(), "/auth/register", bad_email).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing username.
    let mut missing = register_body("alice");
    missing["username"] = json!("");
    let (status, body) = post_json(app, "/auth/register", missing).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], 1002);
}

#[tokio::test]
async fn test_password_never_stored_in_clear() {
    let state = test_state().await;
    let app = router(state.clone());

    let (status, _) = post_json(app, "/auth/register", register_body("alice")).await;
    assert_eq!(status, StatusCode::CREATED);

    let user = state.ctx.users.find_by_username("alice").await.unwrap().unwrap();
    assert!(!user.password_hash.contains("Secret@123"));
    assert!(user.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = test_state().await;
    let app = router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["name"], "worktrack");
}

#[tokio::test]
async fn test_malformed_do_body_is_envelope_error() {
    let state = test_state().await;
    let app = router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/do")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errorCode"], 1001);
}
