// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # HTTP Surface
//!
//! The outer shell over the dispatcher:
//!
//! - `POST /do` — the action endpoint; bearer in the `Authorization` header
//! - `POST /auth/register`, `/auth/login`, `/auth/logout` — open endpoints
//! - `GET /events` — WebSocket upgrade for the push channel
//! - `GET /health` — build name and version
//!
//! Every body in and out of `/do` and `/auth/*` uses the response envelope;
//! transport-level JSON failures are folded into `InvalidRequest` so clients
//! see one error shape.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use worktrack_domain::entities::Registration;
use worktrack_domain::TrackError;

use crate::application::dispatcher::ResponseEnvelope;
use crate::application::{AppContext, AuthService, Dispatcher};
use crate::infrastructure::events::SubscriptionFilter;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
    pub dispatcher: Arc<Dispatcher>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&ctx)));
        let auth = Arc::new(AuthService::new(Arc::clone(&ctx)));
        Self { ctx, dispatcher, auth }
    }
}

/// Builds the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/do", post(do_action))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/events", get(events_upgrade))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::to_string)
}

fn envelope_response(status: u16, body: ResponseEnvelope) -> Response {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (code, Json(body)).into_response()
}

fn error_response(err: TrackError) -> Response {
    envelope_response(err.http_status(), ResponseEnvelope::error(&err))
}

async fn do_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(TrackError::invalid_request(format!("malformed body: {}", rejection)));
        }
    };

    let bearer = bearer_from_headers(&headers);
    let result = state.dispatcher.dispatch(bearer.as_deref(), &body).await;
    envelope_response(result.status, result.body)
}

#[derive(Debug, Deserialize)]
struct RegisterBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    name: String,
}

async fn register(State(state): State<AppState>, body: Result<Json<RegisterBody>, JsonRejection>) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(TrackError::invalid_request(format!("malformed body: {}", rejection)));
        }
    };

    let registration = Registration {
        username: body.username,
        email: body.email,
        password: body.password,
        name: body.name,
    };

    match state.auth.register(registration).await {
        Ok(user) => {
            let mut data = Map::new();
            data.insert("user".into(), serde_json::to_value(&user).unwrap_or(Value::Null));
            envelope_response(201, ResponseEnvelope::ok(data))
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

async fn login(State(state): State<AppState>, body: Result<Json<LoginBody>, JsonRejection>) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(TrackError::invalid_request(format!("malformed body: {}", rejection)));
        }
    };

    match state.auth.login(&body.username, &body.password).await {
        Ok((user, token)) => {
            let mut data = Map::new();
            data.insert("user".into(), serde_json::to_value(&user).unwrap_or(Value::Null));
            data.insert("token".into(), Value::String(token));
            envelope_response(200, ResponseEnvelope::ok(data))
        }
        Err(err) => error_response(err),
    }
}

/// Logout is a client-side token discard; the server acknowledges.
async fn logout() -> Response {
    envelope_response(200, ResponseEnvelope::ok(Map::new()))
}

async fn health() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The subscription frame a push client sends after connecting.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionFrame {
    token: String,
    #[serde(flatten)]
    filter: SubscriptionFilter,
}

async fn events_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_push(state, socket))
}

/// Runs one push connection: subscription frame, ack, then event frames.
async fn handle_push(state: AppState, mut socket: WebSocket) {
    // The first text frame must be the subscription.
    let frame = loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => break text,
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            _ => return,
        }
    };

    let frame: SubscriptionFrame = match serde_json::from_str(&frame) {
        Ok(frame) => frame,
        Err(e) => {
            let _ = socket
                .send(Message::Text(
                    json!({"type": "error", "message": format!("malformed subscription: {e}")}).to_string(),
                ))
                .await;
            return;
        }
    };

    let username = match state.auth.verify(&frame.token).await {
        Ok(claims) => claims.username,
        Err(_) => {
            let _ = socket
                .send(Message::Text(
                    json!({"type": "error", "message": "invalid or expired token"}).to_string(),
                ))
                .await;
            return;
        }
    };

    let mut subscription = state.ctx.hub.subscribe(username.clone(), frame.filter);
    let subscription_id = subscription.id;
    debug!(subscriber = subscription_id, username = %username, "push channel open");

    let ack = json!({"type": "ack", "subscriptionId": subscription_id}).to_string();
    if socket.send(Message::Text(ack)).await.is_err() {
        state.ctx.hub.unsubscribe(subscription_id);
        return;
    }

    loop {
        tokio::select! {
            delivered = subscription.receiver.recv() => {
                match delivered {
                    Some(event) => {
                        let frame = json!({"type": "event", "event": event}).to_string();
                        if socket.send(Message::Text(frame)).await.is_err() {
                            break;
                        }
                    }
                    // The hub disconnected this subscriber (slow consumer).
                    None => {
                        let _ = socket
                            .send(Message::Text(json!({"type": "closed", "reason": "behind"}).to_string()))
                            .await;
                        break;
                    }
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Inbound frames after subscription are ignored.
                    Some(Ok(_)) => continue,
                }
            }
        }
    }

    state.ctx.hub.unsubscribe(subscription_id);
    debug!(subscriber = subscription_id, "push channel closed");
}
