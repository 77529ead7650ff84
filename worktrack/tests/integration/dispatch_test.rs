// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Dispatcher Integration Tests
//!
//! The full dispatch path over a real in-memory stack: envelope decoding,
//! bearer verification, permission checks, routing, and handler outcomes.

use serde_json::json;

use crate::common::{dispatch, dispatch_ok, register_and_login, test_state};

#[tokio::test]
async fn test_missing_bearer_is_unauthorized() {
    let state = test_state().await;
    let result = state
        .dispatcher
        .dispatch(None, &json!({"action": "label.list", "data": {}}))
        .await;
    assert_eq!(result.status, 401);
    assert_eq!(result.body.error_code, 2001);
}

#[tokio::test]
async fn test_garbage_bearer_is_unauthorized() {
    let state = test_state().await;
    let result = state
        .dispatcher
        .dispatch(Some("not-a-token"), &json!({"action": "label.list", "data": {}}))
        .await;
    assert_eq!(result.status, 401);
}

#[tokio::test]
async fn test_malformed_envelope_is_invalid_request() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let result = state.dispatcher.dispatch(Some(&token), &json!({"data": {}})).await;
    assert_eq!(result.status, 400);
    assert_eq!(result.body.error_code, 1001);
}

#[tokio::test]
async fn test_unknown_action_is_invalid_request() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let (status, body) = dispatch(&state, &token, "widget.frobnicate", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body.error_code, 1001);
}

#[tokio::test]
async fn test_create_read_round_trip() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let created = dispatch_ok(
        &state,
        &token,
        "label.create",
        json!({"title": "bug", "color": "#d73a4a"}),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let read = dispatch_ok(&state, &token, "label.read", json!({"id": id})).await;
    assert_eq!(read["title"], "bug");
    assert_eq!(read["color"], "#d73a4a");
    assert_eq!(read["created"], created["created"]);
}

#[tokio::test]
async fn test_soft_delete_hides_from_read_and_list_but_keeps_row() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let created = dispatch_ok(&state, &token, "component.create", json!({"title": "backend"})).await;
    let id = created["id"].as_str().unwrap().to_string();

    dispatch_ok(&state, &token, "component.remove", json!({"id": id})).await;

    let (status, body) = dispatch(&state, &token, "component.read", json!({"id": id})).await;
    assert_eq!(status, 404);
    assert_eq!(body.error_code, 3001);

    let listed = dispatch_ok(&state, &token, "component.list", json!({})).await;
    assert_eq!(listed["total"], 0);

    // The row itself survives for audit.
    let probe = state
        .ctx
        .labeled
        .find_any_by_id(worktrack_domain::entities::LabeledKind::Component, &id)
        .await
        .unwrap();
    assert!(probe.unwrap().deleted);

    // Removing again reports not found.
    let (status, _) = dispatch(&state, &token, "component.remove", json!({"id": id})).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_empty_patch_is_missing_data() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let created = dispatch_ok(&state, &token, "label.create", json!({"title": "bug"})).await;
    let id = created["id"].as_str().unwrap();

    // Only the id (and the ignored pseudo-field) in the patch.
    let (status, body) = dispatch(&state, &token, "label.modify", json!({"id": id, "modified": 1})).await;
    assert_eq!(status, 400);
    assert_eq!(body.error_code, 1002);
}

#[tokio::test]
async fn test_cycle_bad_parent_rejected() {
    // S1: sprint cannot parent a milestone.
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let sprint = dispatch_ok(&state, &token, "cycle.create", json!({"title": "sprint", "type": 10})).await;
    let sprint_id = sprint["id"].as_str().unwrap();

    let (status, body) = dispatch(
        &state,
        &token,
        "cycle.create",
        json!({"title": "milestone", "type": 100, "cycleId": sprint_id}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body.error_code, 1003);
}

#[tokio::test]
async fn test_cycle_good_parent_accepted() {
    // S2: a release may parent a milestone.
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let release = dispatch_ok(&state, &token, "cycle.create", json!({"title": "release", "type": 1000})).await;
    let release_id = release["id"].as_str().unwrap().to_string();

    let milestone = dispatch_ok(
        &state,
        &token,
        "cycle.create",
        json!({"title": "milestone", "type": 100, "cycleId": release_id}),
    )
    .await;
    assert_eq!(milestone["cycleId"].as_str().unwrap(), release_id);
    assert_eq!(milestone["type"], 100);
}

#[tokio::test]
async fn test_cycle_type_outside_closed_set_rejected() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    for bad in [0, 11, 500, -10] {
        let (status, body) = dispatch(&state, &token, "cycle.create", json!({"title": "x", "type": bad})).await;
        assert_eq!(status, 400, "type {bad}");
        assert_eq!(body.error_code, 1003);
    }
}

#[tokio::test]
async fn test_cycle_modify_revalidates_hierarchy() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let release = dispatch_ok(&state, &token, "cycle.create", json!({"title": "release", "type": 1000})).await;
    let sprint = dispatch_ok(
        &state,
        &token,
        "cycle.create",
        json!({"title": "sprint", "type": 10, "cycleId": release["id"]}),
    )
    .await;

    // Raising the child's type above its parent's must fail.
    let (status, body) = dispatch(
        &state,
        &token,
        "cycle.modify",
        json!({"id": sprint["id"], "type": 1000}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body.error_code, 1003);
}

#[tokio::test]
async fn test_priority_level_validation_on_modify() {
    // S3: an invalid level leaves the stored value untouched.
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let priority = dispatch_ok(&state, &token, "priority.create", json!({"title": "High", "level": 3})).await;
    let id = priority["id"].as_str().unwrap().to_string();

    let (status, body) = dispatch(&state, &token, "priority.modify", json!({"id": id, "level": 10})).await;
    assert_eq!(status, 400);
    assert_eq!(body.error_code, 1003);

    let read = dispatch_ok(&state, &token, "priority.read", json!({"id": id})).await;
    assert_eq!(read["level"], 3);
}

#[tokio::test]
async fn test_priority_level_truncates_float_input() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let created = dispatch_ok(&state, &token, "priority.create", json!({"title": "p", "level": 2.9})).await;
    assert_eq!(created["level"], 2);
}

#[tokio::test]
async fn test_label_ticket_attach_idempotence() {
    // S4: attach 201, attach again 409, detach 200, attach 201.
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let label = dispatch_ok(&state, &token, "label.create", json!({"title": "bug"})).await;
    let project = dispatch_ok(
        &state,
        &token,
        "project.create",
        json!({"identifier": "WT", "title": "Worktrack"}),
    )
    .await;
    let ticket = dispatch_ok(
        &state,
        &token,
        "ticket.create",
        json!({"title": "crash", "projectId": project["id"]}),
    )
    .await;

    let attach = json!({"labelId": label["id"], "ticketId": ticket["id"]});

    let (status, _) = dispatch(&state, &token, "ticket.addLabel", attach.clone()).await;
    assert_eq!(status, 201);

    let (status, body) = dispatch(&state, &token, "ticket.addLabel", attach.clone()).await;
    assert_eq!(status, 409);
    assert_eq!(body.error_code, 3002);

    let (status, _) = dispatch(&state, &token, "ticket.removeLabel", attach.clone()).await;
    assert_eq!(status, 200);

    let (status, _) = dispatch(&state, &token, "ticket.addLabel", attach).await;
    assert_eq!(status, 201);

    let labels = dispatch_ok(&state, &token, "ticket.listLabels", json!({"ticketId": ticket["id"]})).await;
    assert_eq!(labels["total"], 1);
}

#[tokio::test]
async fn test_attach_names_the_missing_side() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let label = dispatch_ok(&state, &token, "label.create", json!({"title": "bug"})).await;
    let ghost = worktrack_domain::value_objects::TicketId::new().to_string();

    let (status, body) = dispatch(
        &state,
        &token,
        "ticket.addLabel",
        json!({"labelId": label["id"], "ticketId": ghost}),
    )
    .await;
    assert_eq!(status, 404);
    assert!(body.error_message.contains("ticket"));
}

#[tokio::test]
async fn test_ticket_numbers_and_filters() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let project = dispatch_ok(
        &state,
        &token,
        "project.create",
        json!({"identifier": "WT", "title": "Worktrack"}),
    )
    .await;

    let first = dispatch_ok(
        &state,
        &token,
        "ticket.create",
        json!({"title": "one", "projectId": project["id"], "assignee": "alice"}),
    )
    .await;
    let second = dispatch_ok(
        &state,
        &token,
        "ticket.create",
        json!({"title": "two", "projectId": project["id"]}),
    )
    .await;
    assert_eq!(first["ticketNumber"], 1);
    assert_eq!(second["ticketNumber"], 2);

    let mine = dispatch_ok(&state, &token, "ticket.list", json!({"assignee": "alice"})).await;
    assert_eq!(mine["total"], 1);

    // Unknown filter fields are ignored, not rejected.
    let all = dispatch_ok(&state, &token, "ticket.list", json!({"flavor": "spicy"})).await;
    assert_eq!(all["total"], 2);
}

#[tokio::test]
async fn test_document_content_versioning() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let space = dispatch_ok(&state, &token, "documentSpace.create", json!({"title": "Docs"})).await;
    let document = dispatch_ok(
        &state,
        &token,
        "document.create",
        json!({"title": "Spec", "spaceId": space["id"], "content": "# v1"}),
    )
    .await;
    assert_eq!(document["version"], 1);
    let id = document["id"].as_str().unwrap().to_string();

    let updated = dispatch_ok(
        &state,
        &token,
        "document.updateContent",
        json!({"documentId": id, "content": "# v2"}),
    )
    .await;
    assert_eq!(updated["version"], 2);

    let read = dispatch_ok(&state, &token, "document.read", json!({"id": id})).await;
    assert_eq!(read["version"], 2);

    let old = dispatch_ok(
        &state,
        &token,
        "document.readContent",
        json!({"documentId": id, "version": 1}),
    )
    .await;
    assert_eq!(old["content"], "# v1");

    let versions = dispatch_ok(&state, &token, "document.listVersions", json!({"documentId": id})).await;
    assert_eq!(versions["total"], 2);
}

#[tokio::test]
async fn test_concurrent_content_updates_single_winner() {
    // S5: two racers from version 1; exactly one may win each round.
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let space = dispatch_ok(&state, &token, "documentSpace.create", json!({"title": "Docs"})).await;
    let document = dispatch_ok(
        &state,
        &token,
        "document.create",
        json!({"title": "Spec", "spaceId": space["id"], "content": "base"}),
    )
    .await;
    let id = document["id"].as_str().unwrap().to_string();

    let (a, b) = tokio::join!(
        dispatch(
            &state,
            &token,
            "document.updateContent",
            json!({"documentId": id, "content": "racer a"}),
        ),
        dispatch(
            &state,
            &token,
            "document.updateContent",
            json!({"documentId": id, "content": "racer b"}),
        ),
    );

    let successes = [a.0, b.0].iter().filter(|s| **s == 200).count();
    let conflicts = [&a, &b]
        .iter()
        .filter(|(status, body)| *status == 409 && body.error_code == 3003)
        .count();
    assert!(successes >= 1, "at least one racer must win");
    assert_eq!(successes + conflicts, 2, "losers must see VersionConflict");

    // Final version reflects exactly the successful updates.
    let read = dispatch_ok(&state, &token, "document.read", json!({"id": id})).await;
    assert_eq!(read["version"], 1 + successes as i64);
}

#[tokio::test]
async fn test_comment_with_mentions() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;
    let _ = register_and_login(&state, "bob").await;

    let bob = state.ctx.users.find_by_username("bob").await.unwrap().unwrap();

    let project = dispatch_ok(
        &state,
        &token,
        "project.create",
        json!({"identifier": "WT", "title": "Worktrack"}),
    )
    .await;
    let ticket = dispatch_ok(
        &state,
        &token,
        "ticket.create",
        json!({"title": "crash", "projectId": project["id"]}),
    )
    .await;

    // The same user twice in the mention list collapses to one row; the
    // compound create still lands whole.
    let comment = dispatch_ok(
        &state,
        &token,
        "comment.create",
        json!({
            "body": "looking into it with @bob",
            "ticketId": ticket["id"],
            "mentions": [bob.id.to_string(), bob.id.to_string()],
        }),
    )
    .await;

    let mentions = dispatch_ok(&state, &token, "comment.listMentions", json!({"id": comment["id"]})).await;
    assert_eq!(mentions["total"], 1);

    let comments = dispatch_ok(&state, &token, "ticket.listComments", json!({"ticketId": ticket["id"]})).await;
    assert_eq!(comments["total"], 1);
}

#[tokio::test]
async fn test_comment_create_with_bad_mention_leaves_nothing_behind() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let project = dispatch_ok(
        &state,
        &token,
        "project.create",
        json!({"identifier": "WT", "title": "Worktrack"}),
    )
    .await;
    let ticket = dispatch_ok(
        &state,
        &token,
        "ticket.create",
        json!({"title": "crash", "projectId": project["id"]}),
    )
    .await;

    let ghost = worktrack_domain::value_objects::UserId::new().to_string();
    let (status, _) = dispatch(
        &state,
        &token,
        "comment.create",
        json!({"body": "hi", "ticketId": ticket["id"], "mentions": [ghost]}),
    )
    .await;
    assert_eq!(status, 404);

    // No comment row and no dangling mapping survived the failure.
    let comments = dispatch_ok(&state, &token, "ticket.listComments", json!({"ticketId": ticket["id"]})).await;
    assert_eq!(comments["total"], 0);
}

#[tokio::test]
async fn test_mention_add_remove_round_trip() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;
    let _ = register_and_login(&state, "bob").await;
    let bob = state.ctx.users.find_by_username("bob").await.unwrap().unwrap();

    let comment = dispatch_ok(&state, &token, "comment.create", json!({"body": "ping"})).await;
    let pair = json!({"commentId": comment["id"], "userId": bob.id.to_string()});

    let (status, _) = dispatch(&state, &token, "comment.addMention", pair.clone()).await;
    assert_eq!(status, 201);

    // A live duplicate conflicts.
    let (status, body) = dispatch(&state, &token, "comment.addMention", pair.clone()).await;
    assert_eq!(status, 409);
    assert_eq!(body.error_code, 3002);

    let (status, _) = dispatch(&state, &token, "comment.removeMention", pair.clone()).await;
    assert_eq!(status, 200);
    let (status, _) = dispatch(&state, &token, "comment.removeMention", pair.clone()).await;
    assert_eq!(status, 404);

    // Re-mentioning after removal succeeds again.
    let (status, _) = dispatch(&state, &token, "comment.addMention", pair).await;
    assert_eq!(status, 201);
}

#[tokio::test]
async fn test_forbidden_when_action_is_restricted() {
    let (state, permissions) =
        crate::common::test_state_full(worktrack::infrastructure::config::EventSettings::default()).await;
    let token = register_and_login(&state, "alice").await;

    // project.remove becomes admin-only; alice has the "user" role.
    let project = dispatch_ok(
        &state,
        &token,
        "project.create",
        json!({"identifier": "WT", "title": "Worktrack"}),
    )
    .await;

    permissions.restrict("project", "remove");

    let (status, body) = dispatch(&state, &token, "project.remove", json!({"id": project["id"]})).await;
    assert_eq!(status, 403);
    assert_eq!(body.error_code, 2003);

    // The project is untouched.
    let (status, _) = dispatch(&state, &token, "project.read", json!({"id": project["id"]})).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_metadata_set_get_list_remove() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let project = dispatch_ok(
        &state,
        &token,
        "project.create",
        json!({"identifier": "WT", "title": "Worktrack"}),
    )
    .await;
    let entity = project["id"].as_str().unwrap().to_string();

    // First set creates.
    let (status, body) = dispatch(
        &state,
        &token,
        "metadata.set",
        json!({"entityId": entity, "property": "color", "value": "red"}),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body.data["value"], "red");

    // Second set overwrites in place.
    let (status, body) = dispatch(
        &state,
        &token,
        "metadata.set",
        json!({"entityId": entity, "property": "color", "value": "blue"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body.data["value"], "blue");

    let got = dispatch_ok(
        &state,
        &token,
        "metadata.get",
        json!({"entityId": entity, "property": "color"}),
    )
    .await;
    assert_eq!(got["value"], "blue");

    dispatch_ok(
        &state,
        &token,
        "metadata.set",
        json!({"entityId": entity, "property": "archived", "value": "no"}),
    )
    .await;
    let listed = dispatch_ok(&state, &token, "metadata.list", json!({"entityId": entity})).await;
    assert_eq!(listed["total"], 2);

    dispatch_ok(
        &state,
        &token,
        "metadata.remove",
        json!({"entityId": entity, "property": "color"}),
    )
    .await;
    let (status, _) = dispatch(
        &state,
        &token,
        "metadata.get",
        json!({"entityId": entity, "property": "color"}),
    )
    .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_attachment_checksum_is_computed() {
    let state = test_state().await;
    let token = register_and_login(&state, "alice").await;

    let space = dispatch_ok(&state, &token, "documentSpace.create", json!({"title": "Docs"})).await;
    let document = dispatch_ok(
        &state,
        &token,
        "document.create",
        json!({"title": "Spec", "spaceId": space["id"]}),
    )
    .await;

    let attachment = dispatch_ok(
        &state,
        &token,
        "attachment.create",
        json!({
            "documentId": document["id"],
            "filename": "notes.txt",
            "content": "hello world",
        }),
    )
    .await;

    // sha256("hello world")
    assert_eq!(
        attachment["checksum"],
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
    assert_eq!(attachment["size"], 11);
    assert_eq!(attachment["version"], 1);
}
