// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worktrack Domain Layer
//!
//! Pure business logic for the work-tracking control plane: entities, value
//! objects, the change-event model, the closed error taxonomy, and the ports
//! infrastructure implements.
//!
//! This crate has no runtime, no storage, and no transport. Everything
//! I/O-shaped is a trait; the application crate wires the implementations.
//!
//! ## Layout
//!
//! - [`entities`] — persisted families: tickets, projects, cycles,
//!   documents and their version stream, comments and mentions, users, the
//!   simple labeled family, and the mapping rows
//! - [`value_objects`] — phantom-typed ULID ids, the cycle kind enumeration
//!   with its hierarchy rule, the priority level
//! - [`events`] — the change event published after every successful mutation
//! - [`error`] — the [`TrackError`] taxonomy with wire codes and HTTP
//!   statuses
//! - [`services`] — the permission port and the clock port

pub mod entities;
pub mod error;
pub mod events;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
pub use entities::{
    Attachment, Comment, Cycle, Document, DocumentContent, DocumentVersion, LabeledKind, LabeledRecord, MappingKind,
    MappingRecord, Mention, Project, PublicUser, Registration, Ticket, TicketFilter, User,
};
pub use error::TrackError;
pub use events::{ActionClass, ChangeEvent, EventContext};
pub use value_objects::{CycleKind, PriorityLevel};
