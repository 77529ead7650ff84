// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Push Channel End-to-End Test
//!
//! Serves the real router on an ephemeral port, connects a WebSocket
//! client, subscribes, and watches a mutation arrive as an event frame.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use worktrack::presentation::router;

use crate::common::{dispatch_ok, register_and_login, test_state};

async fn next_text(
    stream: &mut (impl StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("frame within timeout")
            .expect("stream open")
            .expect("frame ok");
        if let Message::Text(text) = message {
            return serde_json::from_str(&text).expect("frame is json");
        }
    }
}

#[tokio::test]
async fn test_subscribe_ack_then_event_frame() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_state = state.clone();
    tokio::spawn(async move {
        axum::serve(listener, router(server_state)).await.unwrap();
    });

    let (mut socket, _) = connect_async(format!("ws://{addr}/events")).await.expect("ws connect");

    // Subscribe to label events.
    let frame = json!({"token": token, "entityTypes": ["label"]}).to_string();
    socket.send(Message::Text(frame)).await.unwrap();

    let ack = next_text(&mut socket).await;
    assert_eq!(ack["type"], "ack");

    // A mutation through the dispatcher fans out to the socket.
    let created = dispatch_ok(&state, &token, "label.create", json!({"title": "bug"})).await;

    let event_frame = next_text(&mut socket).await;
    assert_eq!(event_frame["type"], "event");
    assert_eq!(event_frame["event"]["objectType"], "label");
    assert_eq!(event_frame["event"]["entityId"], created["id"]);
    assert_eq!(event_frame["event"]["action"], "create");

    // A non-matching mutation stays silent; the next matching one arrives
    // in order.
    dispatch_ok(&state, &token, "component.create", json!({"title": "backend"})).await;
    let second = dispatch_ok(&state, &token, "label.create", json!({"title": "feature"})).await;

    let event_frame = next_text(&mut socket).await;
    assert_eq!(event_frame["event"]["entityId"], second["id"]);

    socket.close(None).await.unwrap();
}

#[tokio::test]
async fn test_bad_token_is_rejected_before_ack() {
    let state = test_state().await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });

    let (mut socket, _) = connect_async(format!("ws://{addr}/events")).await.expect("ws connect");
    socket
        .send(Message::Text(json!({"token": "garbage"}).to_string()))
        .await
        .unwrap();

    let frame = next_text(&mut socket).await;
    assert_eq!(frame["type"], "error");
}
