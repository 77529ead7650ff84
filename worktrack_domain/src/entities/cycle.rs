// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cycle Entity
//!
//! A time-boxed grouping of work: Sprint, Milestone, or Release. Cycles form
//! a hierarchy through the optional parent id; the hierarchy rule lives in
//! [`CycleKind::may_parent`] and is enforced here at the entity seam so every
//! creation and re-parenting path goes through the same check.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::{CycleId, CycleKind};

/// A sprint, milestone, or release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cycle {
    pub id: CycleId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Serialized as the numeric wire value (10 / 100 / 1000).
    #[serde(rename = "type")]
    pub kind: CycleKind,
    /// Parent cycle; must be of a strictly coarser kind when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<CycleId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended: Option<i64>,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl Cycle {
    pub fn new(title: String, kind: CycleKind, now: i64) -> Self {
        Self {
            id: CycleId::new(),
            title,
            description: None,
            kind,
            cycle_id: None,
            started: None,
            ended: None,
            created: now,
            modified: now,
            deleted: false,
        }
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if self.title.trim().is_empty() {
            return Err(TrackError::missing_data("title"));
        }
        Ok(())
    }

    /// Enforces the hierarchy rule against a loaded parent.
    ///
    /// The caller resolves `cycle_id` to the parent's kind; absent parents
    /// are reported before this point as `EntityNotFound`.
    pub fn check_parent(&self, parent_kind: CycleKind) -> Result<(), TrackError> {
        if !parent_kind.may_parent(self.kind) {
            return Err(TrackError::invalid_data(format!(
                "a {} (type {}) cannot be the parent of a {} (type {}); the parent type must be strictly greater",
                parent_kind,
                parent_kind.value(),
                self.kind,
                self.kind.value()
            )));
        }
        Ok(())
    }
}
