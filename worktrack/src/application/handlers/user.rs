// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! User read surface.
//!
//! Registration and login live on the auth endpoints; the action namespace
//! only exposes public projections.

use std::sync::Arc;

use worktrack_domain::entities::PublicUser;
use worktrack_domain::TrackError;

use crate::application::context::AppContext;
use crate::application::dispatcher::fields::require_str;
use crate::application::dispatcher::{handler, HandlerOutcome, HandlerRequest, Route};

const OBJECT: &str = "user";

async fn read(ctx: Arc<AppContext>, req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let id = require_str(&req.data, "id")?;
    let user = ctx
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| TrackError::not_found(format!("user {}", id)))?;
    HandlerOutcome::of_entity(200, &user.public())
}

async fn list(ctx: Arc<AppContext>, _req: HandlerRequest) -> Result<HandlerOutcome, TrackError> {
    let users: Vec<PublicUser> = ctx.users.list().await?.iter().map(|u| u.public()).collect();
    HandlerOutcome::of_list(&users)
}

pub fn routes() -> Vec<Route> {
    vec![
        Route::new("user.read", OBJECT, "read", handler(read)),
        Route::new("user.list", OBJECT, "list", handler(list)),
    ]
}
