// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Metadata handlers.
//!
//! Free-form properties on any entity id: `metadata.set` (upsert),
//! `metadata.get`, `metadata.list`, `metadata.remove`. A fresh property
//! responds 201, an overwrite 200.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::require_str;
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

const OBJECT: &str = "metadata";

async fn set(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let entity_id = require_str(&req.data, "entityId")?;
    let property = require_str(&req.data, "property")?;
    let value = require_str(&req.data, "value")?;
    let now = ctx.now();

    let (record, created) = ctx.metadata.set(&entity_id, &property, &value, now).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(record.id.to_string()));
    payload.insert("entityId".into(), Value::String(entity_id));
    payload.insert("property".into(), Value::String(property));
    ctx.publish_change(
        if created { ActionClass::Create } else { ActionClass::Modify },
        OBJECT,
        &record.id.to_string(),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    HandlerOutcome::of_entity(if created { 201 } else { 200 }, &record)
}

async fn get(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let entity_id = require_str(&req.data, "entityId")?;
    let property = require_str(&req.data, "property")?;

    let record = ctx
        .metadata
        .get(&entity_id, &property)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("metadata {} on {}", property, entity_id)))?;
    HandlerOutcome::of_entity(200, &record)
}

async fn list(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let entity_id = require_str(&req.data, "entityId")?;
    let records = ctx.metadata.list(&entity_id).await?;
    HandlerOutcome::of_list(&records)
}

async fn remove(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let entity_id = require_str(&req.data, "entityId")?;
    let property = require_str(&req.data, "property")?;
    let now = ctx.now();

    if !ctx.metadata.remove(&entity_id, &property, now).await? {
        return Err(TrackError::not_found(format!("metadata {} on {}", property, entity_id)));
    }

    let mut payload = Map::new();
    payload.insert("entityId".into(), Value::String(entity_id.clone()));
    payload.insert("property".into(), Value::String(property.clone()));
    ctx.publish_change(
        ActionClass::Remove,
        OBJECT,
        &format!("{}:{}", entity_id, property),
        &req.actor,
        payload,
        EventContext::default().require("read"),
    );

    let mut data = Map::new();
    data.insert("entityId".into(), Value::String(entity_id));
    data.insert("property".into(), Value::String(property));
    Ok(HandlerOutcome::ok(data))
}

pub fn routes() -> Vec<Route> {
    vec![
        Route::new("metadata.set", OBJECT, "modify", handler(set)).mutating(),
        Route::new("metadata.get", OBJECT, "read", handler(get)),
        Route::new("metadata.list", OBJECT, "read", handler(list)),
        Route::new("metadata.remove", OBJECT, "remove", handler(remove)).mutating(),
    ]
}
