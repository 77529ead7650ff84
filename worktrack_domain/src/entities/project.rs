// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Project entity.
//!
//! A project owns tickets and carries a unique identifier string (its natural
//! key) alongside the opaque id. The identifier is what shows up in ticket
//! references; the workflow id points at the status workflow the project's
//! tickets move through.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::ProjectId;

/// A container for tracked work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    /// Unique identifier string, the project's natural key.
    pub identifier: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl Project {
    pub fn new(identifier: String, title: String, now: i64) -> Self {
        Self {
            id: ProjectId::new(),
            identifier,
            title,
            description: None,
            workflow_id: None,
            created: now,
            modified: now,
            deleted: false,
        }
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if self.identifier.trim().is_empty() {
            return Err(TrackError::missing_data("identifier"));
        }
        if self.title.trim().is_empty() {
            return Err(TrackError::missing_data("title"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_identifier_and_title() {
        let mut project = Project::new("WT".into(), "Worktrack".into(), 0);
        assert!(project.validate().is_ok());

        project.identifier = " ".into();
        assert!(matches!(project.validate(), Err(TrackError::MissingData(_))));
    }
}
