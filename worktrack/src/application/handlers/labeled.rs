// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Simple Labeled Entity Handlers
//!
//! One set of handlers serves the whole family; the kind arrives through
//! the route closure. Action tags follow the `<objectType>.<op>` scheme:
//! `label.create`, `priority.modify`, `documentSpace.list`, and so on.
//!
//! List routes are public (no permission call); everything else goes
//! through the port. The family's events carry no permission tags.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::entities::{LabeledKind, LabeledRecord};
use worktrack_domain::value_objects::PriorityLevel;
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::{opt_i64, opt_str, require_i64, require_str, touches_any};
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

fn mutable_fields(kind: LabeledKind) -> Vec<&'static str> {
    let mut fields = vec!["title", "description"];
    if kind.decorated() {
        fields.push("icon");
        fields.push("color");
    }
    if kind.requires_level() {
        fields.push("level");
    }
    fields
}

async fn create(ctx: Arc<AppContext>, req: HandlerRequest, kind: LabeledKind) -> Result<HandlerOutcome, TrackError> {
    let now = ctx.now();
    let mut record = LabeledRecord::new(require_str(&req.data, "title")?, now);
    record.description = opt_str(&req.data, "description")?;
    if kind.decorated() {
        record.icon = opt_str(&req.data, "icon")?;
        record.color = opt_str(&req.data, "color")?;
    }
    if kind.requires_level() {
        record.level = Some(PriorityLevel::new(require_i64(&req.data, "level")?)?);
    }
    record.validate_for(kind)?;

    ctx.labeled.insert(kind, &record).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(record.id.to_string()));
    payload.insert("title".into(), Value::String(record.title.clone()));
    ctx.publish_change(
        ActionClass::Create,
        kind.object_type(),
        &record.id.to_string(),
        &req.actor,
        payload,
        EventContext::default(),
    );

    HandlerOutcome::of_entity(201, &record)
}

async fn read(ctx: Arc<AppContext>, req: HandlerRequest, kind: LabeledKind) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let record = ctx
        .labeled
        .find_by_id(kind, &id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("{} {}", kind.object_type(), id)))?;
    HandlerOutcome::of_entity(200, &record)
}

async fn list(ctx: Arc<AppContext>, _req: HandlerRequest, kind: LabeledKind) -> Result<HandlerOutcome, TrackError> {
    let records = ctx.labeled.list(kind).await?;
    HandlerOutcome::of_list(&records)
}

async fn modify(ctx: Arc<AppContext>, req: HandlerRequest, kind: LabeledKind) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if !touches_any(&req.data, &mutable_fields(kind)) {
        return Err(TrackError::missing_data("no mutable field in patch"));
    }

    let mut record = ctx
        .labeled
        .find_by_id(kind, &id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("{} {}", kind.object_type(), id)))?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));

    if let Some(title) = opt_str(&req.data, "title")? {
        payload.insert("title".into(), Value::String(title.clone()));
        record.title = title;
    } else if req.data.contains_key("title") {
        // Present but blank: a required field cannot be patched to empty.
        return Err(TrackError::missing_data("title"));
    }
    if req.data.contains_key("description") {
        record.description = opt_str(&req.data, "description")?;
    }
    if kind.decorated() {
        if req.data.contains_key("icon") {
            record.icon = opt_str(&req.data, "icon")?;
        }
        if req.data.contains_key("color") {
            record.color = opt_str(&req.data, "color")?;
        }
    }
    if kind.requires_level() {
        if let Some(level) = opt_i64(&req.data, "level")? {
            let level = PriorityLevel::new(level)?;
            payload.insert("level".into(), Value::from(level.value()));
            record.level = Some(level);
        }
    }

    record.validate_for(kind)?;
    record.modified = ctx.now();

    if !ctx.labeled.update(kind, &record).await? {
        return Err(TrackError::not_found(format!("{} {}", kind.object_type(), id)));
    }

    ctx.publish_change(
        ActionClass::Modify,
        kind.object_type(),
        &id,
        &req.actor,
        payload,
        EventContext::default(),
    );

    HandlerOutcome::of_entity(200, &record)
}

async fn remove(ctx: Arc<AppContext>, req: HandlerRequest, kind: LabeledKind) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let now = ctx.now();

    if !ctx.labeled.soft_delete(kind, &id, now).await? {
        return Err(TrackError::not_found(format!("{} {}", kind.object_type(), id)));
    }

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));
    ctx.publish_change(
        ActionClass::Remove,
        kind.object_type(),
        &id,
        &req.actor,
        payload,
        EventContext::default(),
    );

    let mut data = Map::new();
    data.insert("id".into(), Value::String(id));
    Ok(HandlerOutcome::ok(data))
}

/// Routes for all ten kinds.
pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();

    for kind in LabeledKind::ALL {
        let object = kind.object_type();

        routes.push(
            Route::new(
                format!("{object}.create"),
                object,
                "create",
                handler(move |ctx, req| create(ctx, req, kind)),
            )
            .mutating(),
        );
        routes.push(Route::new(
            format!("{object}.read"),
            object,
            "read",
            handler(move |ctx, req| read(ctx, req, kind)),
        ));
        routes.push(
            Route::new(
                format!("{object}.list"),
                object,
                "list",
                handler(move |ctx, req| list(ctx, req, kind)),
            )
            .public(),
        );
        routes.push(
            Route::new(
                format!("{object}.modify"),
                object,
                "modify",
                handler(move |ctx, req| modify(ctx, req, kind)),
            )
            .mutating(),
        );
        routes.push(
            Route::new(
                format!("{object}.remove"),
                object,
                "remove",
                handler(move |ctx, req| remove(ctx, req, kind)),
            )
            .mutating(),
        );
    }

    routes
}
