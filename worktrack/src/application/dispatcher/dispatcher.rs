// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Action Dispatcher
//!
//! The single route table behind `POST /do`. Each action tag maps to a
//! [`Route`] descriptor carrying the object type, the permission action, a
//! mutation flag, a public flag for check-free listings, and the handler.
//!
//! Dispatch order, fixed by contract:
//!
//! 1. decode the envelope (`InvalidRequest` on malformed input)
//! 2. verify the bearer and that its user still exists (`Unauthorized`)
//! 3. resolve the action tag (`InvalidRequest` on unknown tags)
//! 4. ask the permission port unless the route is public
//!    (`PermissionServiceError` on port failure, `Forbidden` on deny)
//! 5. invoke the handler and serialize its outcome
//!
//! Handlers publish their change event themselves before returning; the
//! dispatcher never turns an emit problem into a request failure.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use worktrack_domain::TrackError;

use super::envelope::{HandlerOutcome, RequestEnvelope, ResponseEnvelope};
use crate::application::context::AppContext;
use crate::application::handlers;

/// What a handler receives: the authenticated actor and the envelope data.
pub struct HandlerRequest {
    pub actor: String,
    pub data: Map<String, Value>,
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HandlerOutcome, TrackError>> + Send>>;
pub type HandlerFn = Arc<dyn Fn(Arc<AppContext>, HandlerRequest) -> HandlerFuture + Send + Sync>;

/// Adapts a plain async fn (or capturing closure) into a [`HandlerFn`].
pub fn handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Arc<AppContext>, HandlerRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HandlerOutcome, TrackError>> + Send + 'static,
{
    Arc::new(move |ctx, req| Box::pin(f(ctx, req)))
}

/// One row of the route table.
pub struct Route {
    pub action: String,
    pub object_type: &'static str,
    /// The action class handed to the permission port.
    pub permission_action: &'static str,
    pub mutates: bool,
    /// Public routes skip the permission call (read-only listings only).
    pub public: bool,
    pub handler: HandlerFn,
}

impl Route {
    pub fn new(
        action: impl Into<String>,
        object_type: &'static str,
        permission_action: &'static str,
        handler: HandlerFn,
    ) -> Self {
        Self {
            action: action.into(),
            object_type,
            permission_action,
            mutates: false,
            public: false,
            handler,
        }
    }

    pub fn mutating(mut self) -> Self {
        self.mutates = true;
        self
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }
}

/// The outcome the HTTP layer serializes.
pub struct DispatchResult {
    pub status: u16,
    pub body: ResponseEnvelope,
}

impl DispatchResult {
    fn failure(err: TrackError) -> Self {
        Self {
            status: err.http_status(),
            body: ResponseEnvelope::error(&err),
        }
    }
}

/// The action dispatcher.
pub struct Dispatcher {
    ctx: Arc<AppContext>,
    routes: HashMap<String, Route>,
}

impl Dispatcher {
    /// Builds the full route table over the given context.
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let mut routes = HashMap::new();
        for route in handlers::all_routes() {
            let replaced = routes.insert(route.action.clone(), route);
            debug_assert!(replaced.is_none(), "duplicate action tag registered");
        }
        debug!(actions = routes.len(), "dispatcher route table built");
        Self { ctx, routes }
    }

    /// The closed set of registered action tags.
    pub fn actions(&self) -> Vec<&str> {
        self.routes.keys().map(String::as_str).collect()
    }

    /// Runs the full dispatch sequence for one request body.
    pub async fn dispatch(&self, bearer: Option<&str>, body: &Value) -> DispatchResult {
        let envelope = match RequestEnvelope::decode(body) {
            Ok(envelope) => envelope,
            Err(err) => return DispatchResult::failure(err),
        };

        let actor = match self.authenticate(bearer).await {
            Ok(username) => username,
            Err(err) => return DispatchResult::failure(err),
        };

        let Some(route) = self.routes.get(&envelope.action) else {
            return DispatchResult::failure(TrackError::invalid_request(format!(
                "unknown action: {}",
                envelope.action
            )));
        };

        if !route.public {
            match self
                .ctx
                .permissions
                .check(&actor, route.object_type, route.permission_action)
                .await
            {
                Ok(decision) if decision.is_allowed() => {}
                Ok(_) => {
                    return DispatchResult::failure(TrackError::forbidden(format!(
                        "{} may not {} {}",
                        actor, route.permission_action, route.object_type
                    )));
                }
                Err(err) => {
                    warn!(action = %envelope.action, error = %err, "permission port failure");
                    return DispatchResult::failure(TrackError::PermissionServiceError(err.to_string()));
                }
            }
        }

        let request = HandlerRequest {
            actor: actor.clone(),
            data: envelope.data,
        };

        match (route.handler)(Arc::clone(&self.ctx), request).await {
            Ok(outcome) => {
                info!(action = %envelope.action, actor = %actor, status = outcome.status, "action handled");
                DispatchResult {
                    status: outcome.status,
                    body: ResponseEnvelope::ok(outcome.data),
                }
            }
            Err(err) => {
                if err.is_client_error() {
                    debug!(action = %envelope.action, actor = %actor, error = %err, "action rejected");
                } else {
                    warn!(action = %envelope.action, actor = %actor, error = %err, "action failed");
                }
                DispatchResult::failure(err)
            }
        }
    }

    /// Verifies the bearer and that its account is still live.
    async fn authenticate(&self, bearer: Option<&str>) -> Result<String, TrackError> {
        let Some(token) = bearer else {
            return Err(TrackError::unauthorized("missing bearer credential"));
        };

        let claims = self.ctx.tokens.verify(token)?;

        // A token can outlive its account; reject deleted users here.
        match self.ctx.users.find_by_username(&claims.username).await {
            Ok(Some(_)) => Ok(claims.username),
            Ok(None) => Err(TrackError::unauthorized("invalid or expired token")),
            Err(e) => Err(TrackError::internal_error(format!("user lookup failed: {}", e))),
        }
    }
}
