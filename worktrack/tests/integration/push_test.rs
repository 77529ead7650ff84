// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Event Emission Integration Tests
//!
//! Mutations through the dispatcher must publish exactly one event each,
//! delivered to matching subscribers; failed mutations publish none.

use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;

use worktrack::infrastructure::events::{Subscription, SubscriptionFilter};
use worktrack_domain::ActionClass;

use worktrack::infrastructure::config::EventSettings;

use crate::common::{dispatch, dispatch_ok, register_and_login, test_state, test_state_with_events};

async fn recv_timeout(subscription: &mut Subscription) -> Option<worktrack_domain::ChangeEvent> {
    tokio::time::timeout(Duration::from_secs(1), subscription.receiver.recv())
        .await
        .ok()
        .flatten()
}

#[tokio::test]
async fn test_successful_mutation_emits_one_matching_event() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let mut subscription = state.ctx.hub.subscribe(
        "alice",
        SubscriptionFilter {
            entity_types: ["label".to_string()].into(),
            ..SubscriptionFilter::default()
        },
    );

    let created = dispatch_ok(&state, &token, "label.create", json!({"title": "bug"})).await;
    let id = created["id"].as_str().unwrap();

    let event = recv_timeout(&mut subscription).await.expect("event delivered");
    assert_eq!(event.action, ActionClass::Create);
    assert_eq!(event.object_type, "label");
    assert_eq!(event.entity_id, id);
    assert_eq!(event.actor, "alice");
    assert_eq!(event.payload["title"], "bug");

    // Exactly one: nothing else is queued.
    assert!(recv_timeout(&mut subscription).await.is_none());
}

#[tokio::test]
async fn test_failed_mutation_emits_nothing() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let published_before = state.ctx.hub.counters().published.load(Ordering::Relaxed);

    // Missing title: rejected before any storage write.
    let (status, _) = dispatch(&state, &token, "label.create", json!({})).await;
    assert_eq!(status, 400);

    // Unknown parent: cycle create fails after validation.
    let ghost = worktrack_domain::value_objects::CycleId::new().to_string();
    let (status, _) = dispatch(
        &state,
        &token,
        "cycle.create",
        json!({"title": "c", "type": 10, "cycleId": ghost}),
    )
    .await;
    assert_eq!(status, 404);

    assert_eq!(
        state.ctx.hub.counters().published.load(Ordering::Relaxed),
        published_before
    );
}

#[tokio::test]
async fn test_lifecycle_events_arrive_in_publish_order() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    // Subscribe before mutating so the whole lifecycle is observed.
    let mut subscription = state.ctx.hub.subscribe(
        "alice",
        SubscriptionFilter {
            entity_types: ["label".to_string()].into(),
            ..SubscriptionFilter::default()
        },
    );

    let created = dispatch_ok(&state, &token, "label.create", json!({"title": "bug"})).await;
    let id = created["id"].as_str().unwrap().to_string();
    dispatch_ok(&state, &token, "label.modify", json!({"id": id, "title": "defect"})).await;
    dispatch_ok(&state, &token, "label.remove", json!({"id": id})).await;

    let classes: Vec<ActionClass> = [
        recv_timeout(&mut subscription).await.unwrap(),
        recv_timeout(&mut subscription).await.unwrap(),
        recv_timeout(&mut subscription).await.unwrap(),
    ]
    .into_iter()
    .inspect(|e| assert_eq!(e.entity_id, id))
    .map(|e| e.action)
    .collect();

    assert_eq!(classes, vec![ActionClass::Create, ActionClass::Modify, ActionClass::Remove]);
}

#[tokio::test]
async fn test_ticket_events_carry_project_scope() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let project = dispatch_ok(
        &state,
        &token,
        "project.create",
        json!({"identifier": "WT", "title": "Worktrack"}),
    )
    .await;
    let project_id = project["id"].as_str().unwrap().to_string();

    // Ticket events scoped to this project only.
    let mut scoped = state.ctx.hub.subscribe(
        "alice",
        SubscriptionFilter {
            entity_types: ["ticket".to_string()].into(),
            project_id: Some(project_id.clone()),
            ..SubscriptionFilter::default()
        },
    );

    let ticket = dispatch_ok(
        &state,
        &token,
        "ticket.create",
        json!({"title": "crash", "projectId": project_id}),
    )
    .await;

    let event = recv_timeout(&mut scoped).await.expect("scoped delivery");
    assert_eq!(event.entity_id, ticket["id"].as_str().unwrap());
    assert_eq!(event.context.project_id.as_deref(), Some(project_id.as_str()));
    assert_eq!(event.context.permissions, vec!["read"]);
}

#[tokio::test]
async fn test_slow_subscriber_never_blocks_requests_and_is_disconnected() {
    // Subscriber queue of one; two consecutive drops allowed.
    let state = test_state_with_events(EventSettings {
        publish_buffer: 64,
        subscriber_buffer: 1,
        max_consecutive_drops: 2,
    })
    .await;
    let token = register_and_login(&state, "alice").await;

    let mut lagging = state.ctx.hub.subscribe(
        "alice",
        SubscriptionFilter {
            entity_types: ["label".to_string()].into(),
            ..SubscriptionFilter::default()
        },
    );

    // The lagging subscriber never drains; mutations keep succeeding.
    for i in 0..4 {
        let (status, _) = dispatch(&state, &token, "label.create", json!({"title": format!("l{i}")})).await;
        assert_eq!(status, 201, "mutation {i} must not block on a slow subscriber");
    }

    // The hub eventually drops it after the configured consecutive losses.
    tokio::time::timeout(Duration::from_secs(2), async {
        while state.ctx.hub.subscriber_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("slow subscriber should be disconnected");

    assert_eq!(state.ctx.hub.counters().disconnected.load(Ordering::Relaxed), 1);
    assert!(state.ctx.hub.counters().dropped_subscriber.load(Ordering::Relaxed) >= 2);

    // The one queued event is still readable, then the channel closes.
    assert!(recv_timeout(&mut lagging).await.is_some());
    assert!(recv_timeout(&mut lagging).await.is_none());
}

#[tokio::test]
async fn test_reads_do_not_emit() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    dispatch_ok(&state, &token, "label.create", json!({"title": "bug"})).await;
    let published_after_create = state.ctx.hub.counters().published.load(Ordering::Relaxed);

    dispatch_ok(&state, &token, "label.list", json!({})).await;
    dispatch_ok(&state, &token, "user.list", json!({})).await;

    assert_eq!(
        state.ctx.hub.counters().published.load(Ordering::Relaxed),
        published_after_create
    );
}
