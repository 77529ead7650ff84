// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Context
//!
//! The wired dependency set every handler receives: repositories, clock,
//! permission port, token service, and the event hub. Built once at startup
//! (or per test fixture) and shared behind an `Arc`.

use std::sync::Arc;

use serde_json::{Map, Value};

use worktrack_domain::services::{Clock, PermissionService};
use worktrack_domain::{ActionClass, ChangeEvent, EventContext};

use crate::infrastructure::auth::TokenService;
use crate::infrastructure::events::EventHub;
use crate::infrastructure::repositories::{
    AttachmentRepository, CommentRepository, CycleRepository, DocumentRepository, LabeledRepository,
    MappingRepository, MetadataRepository, ProjectRepository, SqliteStore, TicketRepository, UserRepository,
};

/// Shared handler dependencies.
pub struct AppContext {
    pub labeled: LabeledRepository,
    pub tickets: TicketRepository,
    pub projects: ProjectRepository,
    pub cycles: CycleRepository,
    pub documents: DocumentRepository,
    pub users: UserRepository,
    pub comments: CommentRepository,
    pub attachments: AttachmentRepository,
    pub mappings: MappingRepository,
    pub metadata: MetadataRepository,
    pub clock: Arc<dyn Clock>,
    pub permissions: Arc<dyn PermissionService>,
    pub hub: EventHub,
    pub tokens: TokenService,
}

impl AppContext {
    pub fn new(
        store: SqliteStore,
        clock: Arc<dyn Clock>,
        permissions: Arc<dyn PermissionService>,
        hub: EventHub,
        tokens: TokenService,
    ) -> Self {
        Self {
            labeled: LabeledRepository::new(store.clone()),
            tickets: TicketRepository::new(store.clone()),
            projects: ProjectRepository::new(store.clone()),
            cycles: CycleRepository::new(store.clone()),
            documents: DocumentRepository::new(store.clone()),
            users: UserRepository::new(store.clone()),
            comments: CommentRepository::new(store.clone()),
            attachments: AttachmentRepository::new(store.clone()),
            mappings: MappingRepository::new(store.clone()),
            metadata: MetadataRepository::new(store),
            clock,
            permissions,
            hub,
            tokens,
        }
    }

    /// Current wall-clock time in unix seconds.
    pub fn now(&self) -> i64 {
        self.clock.now_unix()
    }

    /// Publishes the one change event a successful mutation emits.
    ///
    /// Never fails the caller; the hub drops on overflow and counts it.
    pub fn publish_change(
        &self,
        action: ActionClass,
        object_type: &str,
        entity_id: &str,
        actor: &str,
        payload: Map<String, Value>,
        context: EventContext,
    ) {
        let mut event = ChangeEvent::new(action, object_type, entity_id, actor, self.now());
        event.payload = payload;
        event.context = context;
        self.hub.publish(event);
    }
}
