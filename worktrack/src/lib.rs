// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worktrack
//!
//! A work-tracking control plane: one action-dispatch HTTP endpoint over a
//! soft-deleting entity graph (tickets, cycles, projects, documents, labels,
//! comments, …), per-action authorization through a permission port, and
//! near-real-time change fan-out to WebSocket subscribers.
//!
//! ## Layers
//!
//! - [`infrastructure`] — SQLite repositories, the event hub, credential
//!   plumbing, configuration
//! - [`application`] — the dispatcher route table, per-entity handlers, and
//!   the auth service
//! - [`presentation`] — the axum HTTP surface and the push channel
//!
//! Domain types live in the `worktrack-domain` crate; process start/stop
//! glue lives in `worktrack-bootstrap`.

pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use application::{AppContext, AuthService, Dispatcher};
pub use presentation::{router, AppState};
