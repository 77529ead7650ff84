// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Ticket Handlers
//!
//! CRUD with list filters, plus the label / component / asset / vote
//! relations and the comment listing. The project must exist at creation;
//! the ticket number comes back from the repository's insert transaction.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::entities::{MappingKind, Ticket, TicketFilter};
use worktrack_domain::value_objects::ProjectId;
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::{opt_i64, opt_str, require_str, touches_any};
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

use super::relation::{attach_route, detach_route, list_route, ListSide};

const OBJECT: &str = "ticket";
const MUTABLE_FIELDS: [&str; 8] = [
    "title",
    "description",
    "position",
    "typeId",
    "statusId",
    "assignee",
    "estimation",
    "storyPoints",
];

fn ticket_context(ticket: &Ticket) -> EventContext {
    EventContext::with_project(ticket.project_id.to_string()).require("read")
}

async fn create(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let now = ctx.now();
    let project_id = ProjectId::from_string(&require_str(&req.data, "projectId")?)?;

    if !ctx.projects.exists(&project_id.to_string()).await? {
        return Err(TrackError::not_found(format!("project {}", project_id)));
    }

    let mut ticket = Ticket::new(require_str(&req.data, "title")?, project_id, req.actor.clone(), now);
    ticket.description = opt_str(&req.data, "description")?;
    ticket.position = opt_i64(&req.data, "position")?.unwrap_or(0);
    ticket.type_id = opt_str(&req.data, "typeId")?;
    ticket.status_id = opt_str(&req.data, "statusId")?;
    ticket.assignee = opt_str(&req.data, "assignee")?;
    ticket.estimation = opt_i64(&req.data, "estimation")?.unwrap_or(0);
    ticket.story_points = opt_i64(&req.data, "storyPoints")?.unwrap_or(0);
    ticket.validate()?;

    ticket.ticket_number = ctx.tickets.insert(&ticket).await?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(ticket.id.to_string()));
    payload.insert("title".into(), Value::String(ticket.title.clone()));
    payload.insert("ticketNumber".into(), Value::from(ticket.ticket_number));
    ctx.publish_change(
        ActionClass::Create,
        OBJECT,
        &ticket.id.to_string(),
        &req.actor,
        payload,
        ticket_context(&ticket),
    );

    HandlerOutcome::of_entity(201, &ticket)
}

async fn read(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let ticket = ctx
        .tickets
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("ticket {}", id)))?;
    HandlerOutcome::of_entity(200, &ticket)
}

async fn list(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    // Recognized filters only; anything else in data is ignored.
    let filter = TicketFilter {
        project_id: opt_str(&req.data, "projectId")?
            .map(|p| ProjectId::from_string(&p))
            .transpose()?,
        status_id: opt_str(&req.data, "statusId")?,
        assignee: opt_str(&req.data, "assignee")?,
    };

    let tickets = ctx.tickets.list(&filter).await?;
    HandlerOutcome::of_list(&tickets)
}

async fn modify(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    if !touches_any(&req.data, &MUTABLE_FIELDS) {
        return Err(TrackError::missing_data("no mutable field in patch"));
    }

    let mut ticket = ctx
        .tickets
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("ticket {}", id)))?;

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));

    if let Some(title) = opt_str(&req.data, "title")? {
        payload.insert("title".into(), Value::String(title.clone()));
        ticket.title = title;
    } else if req.data.contains_key("title") {
        return Err(TrackError::missing_data("title"));
    }
    if req.data.contains_key("description") {
        ticket.description = opt_str(&req.data, "description")?;
    }
    if let Some(position) = opt_i64(&req.data, "position")? {
        ticket.position = position;
    }
    if req.data.contains_key("typeId") {
        ticket.type_id = opt_str(&req.data, "typeId")?;
    }
    if req.data.contains_key("statusId") {
        if let Some(status) = opt_str(&req.data, "statusId")? {
            payload.insert("statusId".into(), Value::String(status.clone()));
            ticket.status_id = Some(status);
        } else {
            ticket.status_id = None;
        }
    }
    if req.data.contains_key("assignee") {
        let assignee = opt_str(&req.data, "assignee")?;
        if let Some(a) = &assignee {
            payload.insert("assignee".into(), Value::String(a.clone()));
        }
        ticket.assignee = assignee;
    }
    if let Some(estimation) = opt_i64(&req.data, "estimation")? {
        ticket.estimation = estimation;
    }
    if let Some(story_points) = opt_i64(&req.data, "storyPoints")? {
        ticket.story_points = story_points;
    }

    ticket.validate()?;
    ticket.modified = ctx.now();

    if !ctx.tickets.update(&ticket).await? {
        return Err(TrackError::not_found(format!("ticket {}", id)));
    }

    ctx.publish_change(
        ActionClass::Modify,
        OBJECT,
        &id,
        &req.actor,
        payload,
        ticket_context(&ticket),
    );

    HandlerOutcome::of_entity(200, &ticket)
}

async fn remove(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;

    // Load first so the event can carry project scope.
    let ticket = ctx
        .tickets
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("ticket {}", id)))?;

    if !ctx.tickets.soft_delete(&id, ctx.now()).await? {
        return Err(TrackError::not_found(format!("ticket {}", id)));
    }

    let mut payload = Map::new();
    payload.insert("id".into(), Value::String(id.clone()));
    ctx.publish_change(
        ActionClass::Remove,
        OBJECT,
        &id,
        &req.actor,
        payload,
        ticket_context(&ticket),
    );

    let mut data = Map::new();
    data.insert("id".into(), Value::String(id));
    Ok(HandlerOutcome::ok(data))
}

pub fn routes() -> Vec<Route> {
    vec![
        Route::new("ticket.create", OBJECT, "create", handler(create)).mutating(),
        Route::new("ticket.read", OBJECT, "read", handler(read)),
        Route::new("ticket.list", OBJECT, "list", handler(list)),
        Route::new("ticket.modify", OBJECT, "modify", handler(modify)).mutating(),
        Route::new("ticket.remove", OBJECT, "remove", handler(remove)).mutating(),
        // Labels, components, assets: the labeled side is the left endpoint.
        attach_route("ticket.addLabel", OBJECT, MappingKind::LabelTicket),
        detach_route("ticket.removeLabel", OBJECT, MappingKind::LabelTicket),
        list_route("ticket.listLabels", OBJECT, MappingKind::LabelTicket, ListSide::LeftByRight),
        attach_route("ticket.addComponent", OBJECT, MappingKind::ComponentTicket),
        detach_route("ticket.removeComponent", OBJECT, MappingKind::ComponentTicket),
        list_route(
            "ticket.listComponents",
            OBJECT,
            MappingKind::ComponentTicket,
            ListSide::LeftByRight,
        ),
        attach_route("ticket.addAsset", OBJECT, MappingKind::AssetTicket),
        detach_route("ticket.removeAsset", OBJECT, MappingKind::AssetTicket),
        list_route("ticket.listAssets", OBJECT, MappingKind::AssetTicket, ListSide::LeftByRight),
        // Votes: user is the left endpoint.
        attach_route("ticket.vote", OBJECT, MappingKind::Vote),
        detach_route("ticket.unvote", OBJECT, MappingKind::Vote),
        list_route("ticket.listVotes", OBJECT, MappingKind::Vote, ListSide::LeftByRight),
        // Comments attached through the comment_ticket mapping.
        list_route("ticket.listComments", OBJECT, MappingKind::CommentTicket, ListSide::LeftByRight),
    ]
}
