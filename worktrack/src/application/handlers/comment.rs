// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Comment Handlers
//!
//! A comment may be anchored to its ticket or document in the same handler
//! call when `ticketId` / `documentId` is supplied. Mentions arrive as an
//! array of user ids, de-duplicated here; each becomes a mention row,
//! unique per (comment, user) among live rows. The comment row, its anchor
//! mappings, and its mentions are written in one transaction, and the one
//! event covers the whole compound create.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::entities::{Comment, MappingKind, MappingRecord, Mention};
use worktrack_domain::value_objects::UserId;
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::{opt_str, opt_str_array, require_str, touches_any};
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

use super::relation::{attach_route, detach_route, list_route, ListSide};

const OBJECT: &str = "comment";

async fn create(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let now = ctx.now();
    let comment = Comment::new(require_str(&req.data, "body")?, req.actor.clone(), now);
    comment.validate()?;

    let ticket_id = opt_str(&req.data, "ticketId")?;
    let document_id = opt_str(&req.data, "documentId")?;

    if let Some(ticket) = &ticket_id {
        if !ctx.tickets.exists(ticket).await? {
            return Err(TrackError::not_found(format!("ticket {}", ticket)));
        }
    }
    if let Some(document) = &document_id {
        if !ctx.documents.exists(document).await? {
            return Err(TrackError::not_found(format!("document {}", document)));
        }
    }

    // De-duplicate the mention list; one live mention per (comment, user).
    let mentioned = opt_str_array(&req.data, "mentions")?;
    let mut mention_ids: Vec<UserId> = Vec::with_capacity(mentioned.len());
    for user in &mentioned {
        let user_id = UserId::from_string(user)?;
        if mention_ids.contains(&user_id) {
            continue;
        }
        if !ctx.users.exists(user).await? {
            return Err(TrackError::not_found(format!("user {}", user)));
        }
        mention_ids.push(user_id);
    }

    let mut anchors = Vec::new();
    if let Some(ticket) = &ticket_id {
        anchors.push((
            MappingKind::CommentTicket,
            MappingRecord::new(comment.id.to_string(), ticket.clone(), now),
        ));
    }
    if let Some(document) = &document_id {
        anchors.push((
            MappingKind::CommentDocument,
            MappingRecord::new(comment.id.to_string(), document.clone(), now),
        ));
    }
    let mentions: Vec<Mention> = mention_ids
        .into_iter()
        .map(|user_id| Mention::new(comment.id, user_id, now))
        .collect();

    // One transaction for the whole compound write.
    ctx.comments.insert_anchored(&comment, &anchors, &mentions).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(comment.id.to_string()));
    if let Some(ticket) = &ticket_id {
        payload.insert("ticketId".into(), Value::String(ticket.clone()));
    }
    if let Some(document) = &document_id {
        payload.insert("documentId".into(), Value::String(document.clone()));
    }
    ctx.publish_change(
        ActionClass::Create,
        OBJECT,
        &comment.id.to_string(),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    HandlerOutcome::of_entity(201, &comment)
}

async fn read(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let comment = ctx
        .comments
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("comment {}", id)))?;
    HandlerOutcome::of_entity(200, &comment)
}

async fn modify(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if !touches_any(&req.data, &["body"]) {
        return Err(TrackError::missing_data("no mutable field in patch"));
    }

    let mut comment = ctx
        .comments
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("comment {}", id)))?;

    comment.body = require_str(&req.data, "body")?;
    comment.validate()?;
    comment.modified = ctx.now();

    if !ctx.comments.update(&comment).await? {
        return Err(TrackError::not_found(format!("comment {}", id)));
    }

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));
    ctx.publish_change(
        ActionClass::Modify,
        OBJECT,
        &id,
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    HandlerOutcome::of_entity(200, &comment)
}

async fn remove(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;

    if !ctx.comments.soft_delete(&id, ctx.now()).await? {
        return Err(TrackError::not_found(format!("comment {}", id)));
    }

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));
    ctx.publish_change(
        ActionClass::Remove,
        OBJECT,
        &id,
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    let mut data = Map::new();
    data.insert("id".into(), Value::String(id));
    Ok(HandlerOutcome::ok(data))
}

async fn list_mentions(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if ctx.comments.find_by_id(&id).await?.is_none() {
        return Err(TrackError::not_found(format!("comment {}", id)));
    }
    let mentions = ctx.comments.list_mentions(&id).await?;
    HandlerOutcome::of_list(&mentions)
}

/// Mentions a user in an existing comment; re-mentioning after a removal
/// restores the row, a live duplicate conflicts.
async fn add_mention(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let comment_id = require_str(&req.data, "commentId")?;
    let user_id = require_str(&req.data, "userId")?;
    let now = ctx.now();

    let comment = ctx
        .comments
        .find_by_id(&comment_id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("comment {}", comment_id)))?;
    if !ctx.users.exists(&user_id).await? {
        return Err(TrackError::not_found(format!("user {}", user_id)));
    }

    let mention = ctx
        .comments
        .insert_mention(&Mention::new(comment.id, UserId::from_string(&user_id)?, now))
        .await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(mention.id.to_string()));
    payload.insert("commentId".into(), Value::String(comment_id));
    payload.insert("userId".into(), Value::String(user_id));
    ctx.publish_change(
        ActionClass::Create,
        "mention",
        &mention.id.to_string(),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    HandlerOutcome::of_entity(201, &mention)
}

async fn remove_mention(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let comment_id = require_str(&req.data, "commentId")?;
    let user_id = require_str(&req.data, "userId")?;

    if !ctx.comments.remove_mention(&comment_id, &user_id).await? {
        return Err(TrackError::not_found(format!(
            "no live mention of {} in comment {}",
            user_id, comment_id
        )));
    }

    let mut payload = Map::new();
    payload.insert("commentId".into(), Value::String(comment_id.clone()));
    payload.insert("userId".into(), Value::String(user_id.clone()));
    ctx.publish_change(
        ActionClass::Remove,
        "mention",
        &format!("{}:{}", comment_id, user_id),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    let mut data = Map::new();
    data.insert("commentId".into(), Value::String(comment_id));
    data.insert("userId".into(), Value::String(user_id));
    Ok(HandlerOutcome::ok(data))
}

pub fn routes() -> Vec<Route> {
    vec![
        Route::new("comment.create", OBJECT, "create", handler(create)).mutating(),
        Route::new("comment.read", OBJECT, "read", handler(read)),
        Route::new("comment.modify", OBJECT, "modify", handler(modify)).mutating(),
        Route::new("comment.remove", OBJECT, "remove", handler(remove)).mutating(),
        Route::new("comment.listMentions", OBJECT, "read", handler(list_mentions)),
        Route::new("comment.addMention", OBJECT, "modify", handler(add_mention)).mutating(),
        Route::new("comment.removeMention", OBJECT, "modify", handler(remove_mention)).mutating(),
        // Late attachment of an existing comment to a ticket or document.
        attach_route("comment.attachTicket", OBJECT, MappingKind::CommentTicket),
        detach_route("comment.detachTicket", OBJECT, MappingKind::CommentTicket),
        attach_route("comment.attachDocument", OBJECT, MappingKind::CommentDocument),
        detach_route("comment.detachDocument", OBJECT, MappingKind::CommentDocument),
        // Version annotations land through the comment side as well.
        attach_route("comment.attachDocumentVersion", OBJECT, MappingKind::CommentDocumentVersion),
        detach_route("comment.detachDocumentVersion", OBJECT, MappingKind::CommentDocumentVersion),
        list_route(
            "comment.listDocumentVersions",
            OBJECT,
            MappingKind::CommentDocumentVersion,
            ListSide::RightByLeft,
        ),
    ]
}
