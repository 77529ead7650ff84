// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Attachment Handlers
//!
//! The row store keeps attachment metadata; the payload itself lives behind
//! the storage path. Create accepts the payload inline, computes the
//! SHA-256 checksum and size server-side, and records the document version
//! the attachment was added at.

use std::sync::Arc;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use worktrack_domain::entities::Attachment;
use worktrack_domain::value_objects::{AttachmentId, DocumentId};
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::{opt_str, require_str, touches_any};
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

const OBJECT: &str = "attachment";
const MUTABLE_FIELDS: [&str; 2] = ["filename", "description"];

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

async fn create(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let now = ctx.now();
    let document_id = DocumentId::from_string(&require_str(&req.data, "documentId")?)?;

    let document = ctx
        .documents
        .find_by_id(&document_id.to_string())
        .await?
        .ok_or_else(|| TrackError::not_found(format!("document {}", document_id)))?;

    let filename = require_str(&req.data, "filename")?;
    let content = require_str(&req.data, "content")?;

    let id = AttachmentId::new();
    let attachment = Attachment {
        id,
        document_id,
        filename: filename.clone(),
        original_filename: opt_str(&req.data, "originalFilename")?.unwrap_or_else(|| filename.clone()),
        mime: opt_str(&req.data, "mime")?.unwrap_or_else(|| "application/octet-stream".to_string()),
        size: content.len() as i64,
        storage_path: format!("blobs/{}", id),
        checksum: sha256_hex(content.as_bytes()),
        uploader: req.actor.clone(),
        version: document.version,
        description: opt_str(&req.data, "description")?,
        created: now,
        modified: now,
        deleted: false,
    };
    attachment.validate()?;

    ctx.attachments.insert(&attachment).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(attachment.id.to_string()));
    payload.insert("documentId".into(), Value::String(document_id.to_string()));
    payload.insert("filename".into(), Value::String(attachment.filename.clone()));
    ctx.publish_change(
        ActionClass::Create,
        OBJECT,
        &attachment.id.to_string(),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    HandlerOutcome::of_entity(201, &attachment)
}

async fn read(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let attachment = ctx
        .attachments
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("attachment {}", id)))?;
    HandlerOutcome::of_entity(200, &attachment)
}

async fn list(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let document_id = require_str(&req.data, "documentId")?;
    if ctx.documents.find_by_id(&document_id).await?.is_none() {
        return Err(TrackError::not_found(format!("document {}", document_id)));
    }
    let attachments = ctx.attachments.list_by_document(&document_id).await?;
    HandlerOutcome::of_list(&attachments)
}

async fn modify(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if !touches_any(&req.data, &MUTABLE_FIELDS) {
        return Err(TrackError::missing_data("no mutable field in patch"));
    }

    let mut attachment = ctx
        .attachments
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("attachment {}", id)))?;

    if let Some(filename) = opt_str(&req.data, "filename")? {
        attachment.filename = filename;
    } else if req.data.contains_key("filename") {
        return Err(TrackError::missing_data("filename"));
    }
    if req.data.contains_key("description") {
        attachment.description = opt_str(&req.data, "description")?;
    }

    attachment.validate()?;
    attachment.modified = ctx.now();

    if !ctx.attachments.update(&attachment).await? {
        return Err(TrackError::not_found(format!("attachment {}", id)));
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

    HandlerOutcome::of_entity(200, &attachment)
}

async fn remove(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;

    if !ctx.attachments.soft_delete(&id, ctx.now()).await? {
        return Err(TrackError::not_found(format!("attachment {}", id)));
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

pub fn routes() -> Vec<Route> {
    vec![
        Route::new("attachment.create", OBJECT, "create", handler(create)).mutating(),
        Route::new("attachment.read", OBJECT, "read", handler(read)),
        Route::new("attachment.list", OBJECT, "list", handler(list)),
        Route::new("attachment.modify", OBJECT, "modify", handler(modify)).mutating(),
        Route::new("attachment.remove", OBJECT, "remove", handler(remove)).mutating(),
    ]
}
