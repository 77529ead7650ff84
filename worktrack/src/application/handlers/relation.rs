// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Relational (Mapping) Handlers
//!
//! Generic attach / detach / list machinery shared by every per-entity
//! relational action (`cycle.assignProject`, `ticket.addLabel`,
//! `document.link`, …). The [`MappingKind`] descriptor supplies the table,
//! endpoint families, and envelope field names; route constructors here
//! bind a kind and a direction into a concrete action tag.
//!
//! Attach responds 201, detach 200; both emit one event whose entity id is
//! the mapping row id. Listings resolve the joined ids to full entities in
//! mapping `created DESC` order.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::entities::{EndpointFamily, MappingKind};
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::require_str;
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

/// Which side of the mapping a listing walks from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSide {
    /// Input is the left id; output is the right entities.
    RightByLeft,
    /// Input is the right id; output is the left entities.
    LeftByRight,
}

/// Loads one entity of the given family as a JSON value.
///
/// Missing or deleted entities resolve to `None` and are skipped from
/// listings; generic (`Any`) references resolve to their bare id.
async fn load_entity_value(
    ctx: &AppContext,
    family: EndpointFamily,
    id: &str,
) -> Result<Option<Value>, TrackError> {
    let value = match family {
        EndpointFamily::Labeled(kind) => ctx
            .labeled
            .find_by_id(kind, id)
            .await?
            .map(|r| serde_json::to_value(r).ok())
            .flatten(),
        EndpointFamily::Ticket => ctx
            .tickets
            .find_by_id(id)
            .await?
            .map(|t| serde_json::to_value(t).ok())
            .flatten(),
        EndpointFamily::Project => ctx
            .projects
            .find_by_id(id)
            .await?
            .map(|p| serde_json::to_value(p).ok())
            .flatten(),
        EndpointFamily::Cycle => ctx
            .cycles
            .find_by_id(id)
            .await?
            .map(|c| serde_json::to_value(c).ok())
            .flatten(),
        EndpointFamily::Document => ctx
            .documents
            .find_by_id(id)
            .await?
            .map(|d| serde_json::to_value(d).ok())
            .flatten(),
        EndpointFamily::DocumentVersion => ctx
            .documents
            .find_version_by_id(id)
            .await?
            .map(|v| serde_json::to_value(v).ok())
            .flatten(),
        EndpointFamily::Comment => ctx
            .comments
            .find_by_id(id)
            .await?
            .map(|c| serde_json::to_value(c).ok())
            .flatten(),
        EndpointFamily::User => ctx
            .users
            .find_by_id(id)
            .await?
            .map(|u| serde_json::to_value(u.public()).ok())
            .flatten(),
        EndpointFamily::Any => Some(Value::String(id.to_string())),
    };
    Ok(value)
}

async fn attach(ctx: Arc<AppContext>, req: HandlerRequest, kind: MappingKind) -> Result<HandlerOutcome, TrackError> {
    let left_id = require_str(&req.data, kind.left_field())?;
    let right_id = require_str(&req.data, kind.right_field())?;
    let now = ctx.now();

    let record = ctx.mappings.attach(kind, &left_id, &right_id, now).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(record.id.to_string()));
    payload.insert(kind.left_field().into(), Value::String(left_id));
    payload.insert(kind.right_field().into(), Value::String(right_id));
    ctx.publish_change(
        ActionClass::Create,
        kind.object_type(),
        &record.id.to_string(),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    HandlerOutcome::of_entity(201, &record)
}

async fn detach(ctx: Arc<AppContext>, req: HandlerRequest, kind: MappingKind) -> Result<HandlerOutcome, TrackError> {
    let left_id = require_str(&req.data, kind.left_field())?;
    let right_id = require_str(&req.data, kind.right_field())?;
    let now = ctx.now();

    ctx.mappings.detach(kind, &left_id, &right_id, now).await?;

    let mut payload = Map::new();
    payload.insert(kind.left_field().into(), Value::String(left_id.clone()));
    payload.insert(kind.right_field().into(), Value::String(right_id.clone()));
    ctx.publish_change(
        ActionClass::Remove,
        kind.object_type(),
        &format!("{}:{}", left_id, right_id),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    let mut data = Map::new();
    data.insert(kind.left_field().into(), Value::String(left_id));
    data.insert(kind.right_field().into(), Value::String(right_id));
    Ok(HandlerOutcome::ok(data))
}

async fn list_related(
    ctx: Arc<AppContext>,
    req: HandlerRequest,
    kind: MappingKind,
    side: ListSide,
) -> Result<HandlerOutcome, TrackError> {
    let (ids, family) = match side {
        ListSide::RightByLeft => {
            let left_id = require_str(&req.data, kind.left_field())?;
            (ctx.mappings.list_right_ids(kind, &left_id).await?, kind.right())
        }
        ListSide::LeftByRight => {
            let right_id = require_str(&req.data, kind.right_field())?;
            (ctx.mappings.list_left_ids(kind, &right_id).await?, kind.left())
        }
    };

    let mut items = Vec::with_capacity(ids.len());
    for id in &ids {
        if let Some(value) = load_entity_value(&ctx, family, id).await? {
            items.push(value);
        }
    }

    let mut data = Map::new();
    data.insert("total".into(), Value::from(items.len()));
    data.insert("items".into(), Value::Array(items));
    Ok(HandlerOutcome::ok(data))
}

/// An attach route (`…Assign…` / `…add…` tags). Always mutating.
pub fn attach_route(
    tag: impl Into<String>,
    object_type: &'static str,
    kind: MappingKind,
) -> Route {
    Route::new(tag, object_type, "modify", handler(move |ctx, req| attach(ctx, req, kind))).mutating()
}

/// A detach route. Always mutating.
pub fn detach_route(
    tag: impl Into<String>,
    object_type: &'static str,
    kind: MappingKind,
) -> Route {
    Route::new(tag, object_type, "modify", handler(move |ctx, req| detach(ctx, req, kind))).mutating()
}

/// A listing route walking the mapping in the given direction.
pub fn list_route(
    tag: impl Into<String>,
    object_type: &'static str,
    kind: MappingKind,
    side: ListSide,
) -> Route {
    Route::new(
        tag,
        object_type,
        "read",
        handler(move |ctx, req| list_related(ctx, req, kind, side)),
    )
}
