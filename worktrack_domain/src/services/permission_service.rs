// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Permission Service Port
//!
//! The boundary the core calls before mutating or reading anything. The
//! dispatcher asks once per request; the push hub asks once per (event,
//! subscriber, tag) before delivery.
//!
//! A port failure is distinct from a denial: failures surface as
//! `PermissionServiceError` / 500, denials as `Forbidden` / 403.

use async_trait::async_trait;

use crate::error::TrackError;

/// The outcome of a permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// The permission boundary.
///
/// `object` is the entity family ("ticket", "cycle", …); `action` is the
/// operation class ("create", "read", "list", "modify", "remove", or a
/// relational tag).
#[async_trait]
pub trait PermissionService: Send + Sync {
    /// Checks whether `username` may perform `action` on `object`.
    ///
    /// Returns `Err(TrackError::PermissionServiceError)` when the port
    /// itself fails; the caller maps that to HTTP 500 rather than 403.
    async fn check(&self, username: &str, object: &str, action: &str) -> Result<Decision, TrackError>;
}
