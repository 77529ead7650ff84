// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Project handlers.
//!
//! The identifier string is the natural key: a create against a taken
//! identifier is `EntityAlreadyExists`. `project.listTickets` is a filtered
//! ticket listing; `project.listCycles` walks the cycle_projects mapping.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::entities::{MappingKind, Project, TicketFilter};
use worktrack_domain::value_objects::ProjectId;
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::{opt_str, require_str, touches_any};
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

use super::relation::{list_route, ListSide};

const OBJECT: &str = "project";
const MUTABLE_FIELDS: [&str; 4] = ["identifier", "title", "description", "workflowId"];

fn project_context(id: &ProjectId) -> EventContext {
    EventContext::with_project(id.to_string()).require("read")
}

async fn create(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let now = ctx.now();
    let identifier = require_str(&req.data, "identifier")?;

    if ctx.projects.find_by_identifier(&identifier).await?.is_some() {
        return Err(TrackError::already_exists(format!(
            "project identifier {} is taken",
            identifier
        )));
    }

    let mut project = Project::new(identifier, require_str(&req.data, "title")?, now);
    project.description = opt_str(&req.data, "description")?;
    project.workflow_id = opt_str(&req.data, "workflowId")?;
    project.validate()?;

    ctx.projects.insert(&project).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(project.id.to_string()));
    payload.insert("identifier".into(), Value::String(project.identifier.clone()));
    ctx.publish_change(
        ActionClass::Create,
        OBJECT,
        &project.id.to_string(),
        &req.actor,
        payload,
        project_context(&project.id),
    );

    HandlerOutcome::of_entity(201, &project)
}

async fn read(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let project = ctx
        .projects
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("project {}", id)))?;
    HandlerOutcome::of_entity(200, &project)
}

async fn list(ctx: Arc<AppContext>, _req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let projects = ctx.projects.list().await?;
    HandlerOutcome::of_list(&projects)
}

async fn modify(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if !touches_any(&req.data, &MUTABLE_FIELDS) {
        return Err(TrackError::missing_data("no mutable field in patch"));
    }

    let mut project = ctx
        .projects
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("project {}", id)))?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));

    if let Some(identifier) = opt_str(&req.data, "identifier")? {
        if identifier != project.identifier {
            if ctx.projects.find_by_identifier(&identifier).await?.is_some() {
                return Err(TrackError::already_exists(format!(
                    "project identifier {} is taken",
                    identifier
                )));
            }
            payload.insert("identifier".into(), Value::String(identifier.clone()));
            project.identifier = identifier;
        }
    } else if req.data.contains_key("identifier") {
        return Err(TrackError::missing_data("identifier"));
    }
    if let Some(title) = opt_str(&req.data, "title")? {
        payload.insert("title".into(), Value::String(title.clone()));
        project.title = title;
    } else if req.data.contains_key("title") {
        return Err(TrackError::missing_data("title"));
    }
    if req.data.contains_key("description") {
        project.description = opt_str(&req.data, "description")?;
    }
    if req.data.contains_key("workflowId") {
        project.workflow_id = opt_str(&req.data, "workflowId")?;
    }

    project.validate()?;
    project.modified = ctx.now();

    if !ctx.projects.update(&project).await? {
        return Err(TrackError::not_found(format!("project {}", id)));
    }

    ctx.publish_change(
        ActionClass::Modify,
        OBJECT,
        &id,
        &req.actor,
        payload,
        project_context(&project.id),
    );

    HandlerOutcome::of_entity(200, &project)
}

async fn remove(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let project_id = ProjectId::from_string(&id)?;

    if !ctx.projects.soft_delete(&id, ctx.now()).await? {
        return Err(TrackError::not_found(format!("project {}", id)));
    }

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));
    ctx.publish_change(
        ActionClass::Remove,
        OBJECT,
        &id,
        &req.actor,
        payload,
        project_context(&project_id),
    );

    let mut data = Map::new();
    data.insert("id".into(), Value::String(id));
    Ok(HandlerOutcome::ok(data))
}

/// Filtered ticket listing scoped to one project.
async fn list_tickets(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let project_id = ProjectId::from_string(&require_str(&req.data, "projectId")?)?;

    if !ctx.projects.exists(&project_id.to_string()).await? {
        return Err(TrackError::not_found(format!("project {}", project_id)));
    }

    let filter = TicketFilter {
        project_id: Some(project_id),
        status_id: opt_str(&req.data, "statusId")?,
        assignee: opt_str(&req.data, "assignee")?,
    };
    let tickets = ctx.tickets.list(&filter).await?;
    HandlerOutcome::of_list(&tickets)
}

pub fn routes() -> Vec<Route> {
    vec![
        Route::new("project.create", OBJECT, "create", handler(create)).mutating(),
        Route::new("project.read", OBJECT, "read", handler(read)),
        Route::new("project.list", OBJECT, "list", handler(list)),
        Route::new("project.modify", OBJECT, "modify", handler(modify)).mutating(),
        Route::new("project.remove", OBJECT, "remove", handler(remove)).mutating(),
        Route::new("project.listTickets", OBJECT, "read", handler(list_tickets)),
        // Cycles attached through cycle_projects; project is the right side.
        list_route("project.listCycles", OBJECT, MappingKind::CycleProject, ListSide::LeftByRight),
    ]
}
