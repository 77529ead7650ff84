// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cycle Handlers
//!
//! CRUD plus the project and ticket relations. Creation and every modify
//! re-validate the hierarchy rule: a present parent must exist and be of a
//! strictly coarser kind, whether the patch changed the parent, the type,
//! or both.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::entities::{Cycle, MappingKind};
use worktrack_domain::value_objects::{CycleId, CycleKind};
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::{opt_i64, opt_str, require_i64, require_str, touches_any};
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

use super::relation::{attach_route, detach_route, list_route, ListSide};

const OBJECT: &str = "cycle";
const MUTABLE_FIELDS: [&str; 6] = ["title", "description", "type", "cycleId", "started", "ended"];

/// Resolves and checks the parent rule for a cycle that carries one.
async fn check_parent(ctx: &AppContext, cycle: &Cycle) -> Result<(), TrackError> {
    let Some(parent_id) = cycle.cycle_id else {
        return Ok(());
    };
    if parent_id == cycle.id {
        return Err(TrackError::invalid_data("a cycle cannot be its own parent"));
    }

    let parent = ctx
        .cycles
        .find_by_id(&parent_id.to_string())
        .await?
        .ok_or_else(|| TrackError::not_found(format!("parent cycle {}", parent_id)))?;

    cycle.check_parent(parent.kind)
}

async fn create(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let now = ctx.now();
    let kind = CycleKind::from_value(require_i64(&req.data, "type")?)?;

    let mut cycle = Cycle::new(require_str(&req.data, "title")?, kind, now);
    cycle.description = opt_str(&req.data, "description")?;
    cycle.started = opt_i64(&req.data, "started")?;
    cycle.ended = opt_i64(&req.data, "ended")?;
    if let Some(parent) = opt_str(&req.data, "cycleId")? {
        cycle.cycle_id = Some(CycleId::from_string(&parent)?);
    }

    cycle.validate()?;
    check_parent(&ctx, &cycle).await?;

    ctx.cycles.insert(&cycle).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(cycle.id.to_string()));
    payload.insert("title".into(), Value::String(cycle.title.clone()));
    payload.insert("type".into(), Value::from(cycle.kind.value()));
    ctx.publish_change(
        ActionClass::Create,
        OBJECT,
        &cycle.id.to_string(),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    HandlerOutcome::of_entity(201, &cycle)
}

async fn read(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let cycle = ctx
        .cycles
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("cycle {}", id)))?;
    HandlerOutcome::of_entity(200, &cycle)
}

async fn list(ctx: Arc<AppContext>, _req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let cycles = ctx.cycles.list().await?;
    HandlerOutcome::of_list(&cycles)
}

async fn modify(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if !touches_any(&req.data, &MUTABLE_FIELDS) {
        return Err(TrackError::missing_data("no mutable field in patch"));
    }

    let mut cycle = ctx
        .cycles
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("cycle {}", id)))?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));

    if let Some(title) = opt_str(&req.data, "title")? {
        payload.insert("title".into(), Value::String(title.clone()));
        cycle.title = title;
    } else if req.data.contains_key("title") {
        return Err(TrackError::missing_data("title"));
    }
    if req.data.contains_key("description") {
        cycle.description = opt_str(&req.data, "description")?;
    }
    if let Some(kind_value) = opt_i64(&req.data, "type")? {
        cycle.kind = CycleKind::from_value(kind_value)?;
        payload.insert("type".into(), Value::from(cycle.kind.value()));
    }
    if req.data.contains_key("cycleId") {
        // Blank clears the parent; anything else must parse.
        cycle.cycle_id = opt_str(&req.data, "cycleId")?
            .map(|p| CycleId::from_string(&p))
            .transpose()?;
    }
    if req.data.contains_key("started") {
        cycle.started = opt_i64(&req.data, "started")?;
    }
    if req.data.contains_key("ended") {
        cycle.ended = opt_i64(&req.data, "ended")?;
    }

    cycle.validate()?;
    check_parent(&ctx, &cycle).await?;
    cycle.modified = ctx.now();

    if !ctx.cycles.update(&cycle).await? {
        return Err(TrackError::not_found(format!("cycle {}", id)));
    }

    ctx.publish_change(
        ActionClass::Modify,
        OBJECT,
        &id,
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    HandlerOutcome::of_entity(200, &cycle)
}

async fn remove(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let now = ctx.now();

    if !ctx.cycles.soft_delete(&id, now).await? {
        return Err(TrackError::not_found(format!("cycle {}", id)));
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
        Route::new("cycle.create", OBJECT, "create", handler(create)).mutating(),
        Route::new("cycle.read", OBJECT, "read", handler(read)),
        Route::new("cycle.list", OBJECT, "list", handler(list)),
        Route::new("cycle.modify", OBJECT, "modify", handler(modify)).mutating(),
        Route::new("cycle.remove", OBJECT, "remove", handler(remove)).mutating(),
        // Project relation: cycle is the left endpoint.
        attach_route("cycle.assignProject", OBJECT, MappingKind::CycleProject),
        detach_route("cycle.unassignProject", OBJECT, MappingKind::CycleProject),
        list_route("cycle.listProjects", OBJECT, MappingKind::CycleProject, ListSide::RightByLeft),
        // Ticket relation: ticket is the left endpoint of ticket_cycles.
        attach_route("cycle.addTicket", OBJECT, MappingKind::TicketCycle),
        detach_route("cycle.removeTicket", OBJECT, MappingKind::TicketCycle),
        list_route("cycle.listTickets", OBJECT, MappingKind::TicketCycle, ListSide::LeftByRight),
    ]
}
