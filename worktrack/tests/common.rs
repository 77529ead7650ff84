// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Common Test Helpers
//!
//! Shared fixture for integration and end-to-end tests: an in-memory store
//! wired exactly like the production stack, plus helpers to register a user
//! and dispatch actions.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use worktrack::application::dispatcher::ResponseEnvelope;
use worktrack::application::AppContext;
use worktrack::infrastructure::auth::TokenService;
use worktrack::infrastructure::config::EventSettings;
use worktrack::infrastructure::events::EventHub;
use worktrack::infrastructure::permission::RolePermissionService;
use worktrack::infrastructure::repositories::{SqliteStore, UserRepository};
use worktrack::presentation::AppState;
use worktrack_domain::entities::Registration;
use worktrack_domain::services::SystemClock;

pub const TEST_SECRET: &str = "integration-test-signing-secret!!";

/// Builds a full application state over an in-memory database.
pub async fn test_state() -> AppState {
    test_state_with_events(EventSettings::default()).await
}

/// Same, with custom hub settings (small queues for slow-subscriber tests).
pub async fn test_state_with_events(events: EventSettings) -> AppState {
    let (state, _) = test_state_full(events).await;
    state
}

/// Full fixture: the state plus the concrete permission service, so tests
/// can add restrictions after wiring.
pub async fn test_state_full(events: EventSettings) -> (AppState, Arc<RolePermissionService>) {
    let store = SqliteStore::in_memory().await.expect("in-memory store");
    let permissions = Arc::new(RolePermissionService::new(UserRepository::new(store.clone())));
    let hub = EventHub::start(permissions.clone(), &events);
    let tokens = TokenService::new(TEST_SECRET, 3600);

    let ctx = Arc::new(AppContext::new(
        store,
        Arc::new(SystemClock),
        permissions.clone(),
        hub,
        tokens,
    ));
    (AppState::new(ctx), permissions)
}

/// Registers a user and returns a bearer token for them.
pub async fn register_and_login(state: &AppState, username: &str) -> String {
    state
        .auth
        .register(Registration {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "Secret@123".to_string(),
            name: username.to_string(),
        })
        .await
        .expect("registration");

    let (_, token) = state.auth.login(username, "Secret@123").await.expect("login");
    token
}

/// Dispatches one action through the dispatcher, as `/do` would.
pub async fn dispatch(state: &AppState, token: &str, action: &str, data: Value) -> (u16, ResponseEnvelope) {
    let body = json!({"action": action, "data": data});
    let result = state.dispatcher.dispatch(Some(token), &body).await;
    (result.status, result.body)
}

/// Convenience: dispatch expecting success, returning the data map.
pub async fn dispatch_ok(state: &AppState, token: &str, action: &str, data: Value) -> Map<String, Value> {
    let (status, body) = dispatch(state, token, action, data).await;
    assert!(
        (200..300).contains(&status),
        "{action} failed: {status} {} {}",
        body.error_code,
        body.error_message
    );
    assert_eq!(body.error_code, 0);
    body.data
}
