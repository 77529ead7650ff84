// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Handlers
//!
//! CRUD, the versioned content stream (`updateContent` / `readContent` /
//! `listVersions`), the document tree (`listChildren`), and the tag / label
//! / link relations.
//!
//! `updateContent` is the serialized sequence: load version V, insert
//! content V+1, bump the document with the optimistic guard. A stale V
//! surfaces as `VersionConflict` with no partial write.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::entities::{Document, DocumentContent, MappingKind};
use worktrack_domain::value_objects::{DocumentId, ProjectId};
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::{opt_bool, opt_i64, opt_str, require_str, touches_any};
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

use super::relation::{attach_route, detach_route, list_route, ListSide};

const OBJECT: &str = "document";
const MUTABLE_FIELDS: [&str; 8] = [
    "title",
    "spaceId",
    "typeId",
    "parentId",
    "projectId",
    "position",
    "published",
    "archived",
];

fn document_context(document: &Document) -> EventContext {
    let mut context = EventContext::default().require("read");
    context.project_id = document.project_id.map(|p| p.to_string());
    context
}

async fn create(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let now = ctx.now();

    let mut document = Document::new(
        require_str(&req.data, "title")?,
        require_str(&req.data, "spaceId")?,
        req.actor.clone(),
        now,
    );
    document.type_id = opt_str(&req.data, "typeId")?;
    document.position = opt_i64(&req.data, "position")?.unwrap_or(0);
    if let Some(parent) = opt_str(&req.data, "parentId")? {
        let parent_id = DocumentId::from_string(&parent)?;
        if ctx.documents.find_by_id(&parent).await?.is_none() {
            return Err(TrackError::not_found(format!("parent document {}", parent)));
        }
        document.parent_id = Some(parent_id);
    }
    if let Some(project) = opt_str(&req.data, "projectId")? {
        let project_id = ProjectId::from_string(&project)?;
        if !ctx.projects.exists(&project).await? {
            return Err(TrackError::not_found(format!("project {}", project)));
        }
        document.project_id = Some(project_id);
    }
    document.validate()?;

    let content = DocumentContent::new(
        document.id,
        1,
        opt_str(&req.data, "content")?.unwrap_or_default(),
        opt_str(&req.data, "contentType")?,
        now,
    );

    ctx.documents.insert(&document, &content).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(document.id.to_string()));
    payload.insert("title".into(), Value::String(document.title.clone()));
    ctx.publish_change(
        ActionClass::Create,
        OBJECT,
        &document.id.to_string(),
        &req.actor,
        payload,
        document_context(&document),
    );

    HandlerOutcome::of_entity(201, &document)
}

async fn read(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let document = ctx
        .documents
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("document {}", id)))?;
    HandlerOutcome::of_entity(200, &document)
}

async fn list(ctx: Arc<AppContext>, _req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let documents = ctx.documents.list().await?;
    HandlerOutcome::of_list(&documents)
}

async fn list_children(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if ctx.documents.find_by_id(&id).await?.is_none() {
        return Err(TrackError::not_found(format!("document {}", id)));
    }
    let children = ctx.documents.list_children(&id).await?;
    HandlerOutcome::of_list(&children)
}

async fn modify(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if !touches_any(&req.data, &MUTABLE_FIELDS) {
        return Err(TrackError::missing_data("no mutable field in patch"));
    }

    let mut document = ctx
        .documents
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("document {}", id)))?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));

    if let Some(title) = opt_str(&req.data, "title")? {
        payload.insert("title".into(), Value::String(title.clone()));
        document.title = title;
    } else if req.data.contains_key("title") {
        return Err(TrackError::missing_data("title"));
    }
    if let Some(space_id) = opt_str(&req.data, "spaceId")? {
        document.space_id = space_id;
    } else if req.data.contains_key("spaceId") {
        return Err(TrackError::missing_data("spaceId"));
    }
    if req.data.contains_key("typeId") {
        document.type_id = opt_str(&req.data, "typeId")?;
    }
    if req.data.contains_key("parentId") {
        match opt_str(&req.data, "parentId")? {
            Some(parent) => {
                let parent_id = DocumentId::from_string(&parent)?;
                if parent_id == document.id {
                    return Err(TrackError::invalid_data("a document cannot be its own parent"));
                }
                if ctx.documents.find_by_id(&parent).await?.is_none() {
                    return Err(TrackError::not_found(format!("parent document {}", parent)));
                }
                document.parent_id = Some(parent_id);
            }
            None => document.parent_id = None,
        }
    }
    if req.data.contains_key("projectId") {
        match opt_str(&req.data, "projectId")? {
            Some(project) => {
                if !ctx.projects.exists(&project).await? {
                    return Err(TrackError::not_found(format!("project {}", project)));
                }
                document.project_id = Some(ProjectId::from_string(&project)?);
            }
            None => document.project_id = None,
        }
    }
    if let Some(position) = opt_i64(&req.data, "position")? {
        document.position = position;
    }
    if let Some(published) = opt_bool(&req.data, "published")? {
        payload.insert("published".into(), Value::Bool(published));
        document.published = published;
    }
    if let Some(archived) = opt_bool(&req.data, "archived")? {
        payload.insert("archived".into(), Value::Bool(archived));
        document.archived = archived;
    }

    document.validate()?;
    document.modified = ctx.now();

    if !ctx.documents.update(&document).await? {
        return Err(TrackError::not_found(format!("document {}", id)));
    }

    ctx.publish_change(
        ActionClass::Modify,
        OBJECT,
        &id,
        &req.actor,
        payload,
        document_context(&document),
    );

    HandlerOutcome::of_entity(200, &document)
}

async fn remove(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;

    let document = ctx
        .documents
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("document {}", id)))?;

    if !ctx.documents.soft_delete(&id, ctx.now()).await? {
        return Err(TrackError::not_found(format!("document {}", id)));
    }

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));
    ctx.publish_change(
        ActionClass::Remove,
        OBJECT,
        &id,
        &req.actor,
        payload,
        document_context(&document),
    );

    let mut data = Map::new();
    data.insert("id".into(), Value::String(id));
    Ok(HandlerOutcome::ok(data))
}

/// The serialized content update with the optimistic version guard.
async fn update_content(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "documentId")?;
    let body = require_str(&req.data, "content")?;
    let content_type = opt_str(&req.data, "contentType")?;
    let now = ctx.now();

    let document = ctx
        .documents
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("document {}", id)))?;

    let next = DocumentContent::new(document.id, document.version + 1, body, content_type, now);
    ctx.documents
        .update_content(&id, document.version, &next, &req.actor, now)
        .await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));
    payload.insert("version".into(), Value::from(next.version));
    ctx.publish_change(
        ActionClass::Modify,
        OBJECT,
        &id,
        &req.actor,
        payload,
        document_context(&document),
    );

    HandlerOutcome::of_entity(200, &next)
}

async fn read_content(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "documentId")?;
    let version = opt_i64(&req.data, "version")?;

    if ctx.documents.find_by_id(&id).await?.is_none() {
        return Err(TrackError::not_found(format!("document {}", id)));
    }

    let content = ctx
        .documents
        .find_content(&id, version)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("content for document {}", id)))?;
    HandlerOutcome::of_entity(200, &content)
}

async fn list_versions(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "documentId")?;
    if ctx.documents.find_by_id(&id).await?.is_none() {
        return Err(TrackError::not_found(format!("document {}", id)));
    }
    let versions = ctx.documents.list_versions(&id).await?;
    HandlerOutcome::of_list(&versions)
}

pub fn routes() -> Vec<Route> {
    vec![
        Route::new("document.create", OBJECT, "create", handler(create)).mutating(),
        Route::new("document.read", OBJECT, "read", handler(read)),
        Route::new("document.list", OBJECT, "list", handler(list)),
        Route::new("document.listChildren", OBJECT, "read", handler(list_children)),
        Route::new("document.modify", OBJECT, "modify", handler(modify)).mutating(),
        Route::new("document.remove", OBJECT, "remove", handler(remove)).mutating(),
        Route::new("document.updateContent", OBJECT, "modify", handler(update_content)).mutating(),
        Route::new("document.readContent", OBJECT, "read", handler(read_content)),
        Route::new("document.listVersions", OBJECT, "read", handler(list_versions)),
        // Tags: the tag is the left endpoint of document_tag_mappings.
        attach_route("document.addTag", OBJECT, MappingKind::DocumentTagDocument),
        detach_route("document.removeTag", OBJECT, MappingKind::DocumentTagDocument),
        list_route("document.listTags", OBJECT, MappingKind::DocumentTagDocument, ListSide::LeftByRight),
        // Labels on documents.
        attach_route("document.addLabel", OBJECT, MappingKind::LabelDocument),
        detach_route("document.removeLabel", OBJECT, MappingKind::LabelDocument),
        list_route("document.listLabels", OBJECT, MappingKind::LabelDocument, ListSide::LeftByRight),
        // Generic entity links: the document is the left endpoint.
        attach_route("document.link", OBJECT, MappingKind::DocumentEntityLink),
        detach_route("document.unlink", OBJECT, MappingKind::DocumentEntityLink),
        list_route("document.listLinks", OBJECT, MappingKind::DocumentEntityLink, ListSide::RightByLeft),
        // Comments attached through comment_document_mappings.
        list_route("document.listComments", OBJECT, MappingKind::CommentDocument, ListSide::LeftByRight),
        // Version annotations.
        attach_route("document.labelVersion", OBJECT, MappingKind::LabelDocumentVersion),
        detach_route("document.unlabelVersion", OBJECT, MappingKind::LabelDocumentVersion),
        list_route(
            "document.listVersionLabels",
            OBJECT,
            MappingKind::LabelDocumentVersion,
            ListSide::LeftByRight,
        ),
    ]
}
