// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Ticket Entity
//!
//! The central unit of tracked work. A ticket belongs to exactly one project
//! and carries a human-facing ticket number unique within that project,
//! assigned from a per-project counter inside the insert transaction.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::{ProjectId, TicketId};

/// A tracked unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    /// Human ticket number, unique within the project.
    pub ticket_number: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordering position inside board columns.
    pub position: i64,
    /// Ticket type id (simple labeled entity).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    /// Workflow status id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
    pub project_id: ProjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub estimation: i64,
    pub story_points: i64,
    /// Username of the creator.
    pub creator: String,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl Ticket {
    /// Creates a ticket with server-assigned identity and timestamps.
    ///
    /// The ticket number is a placeholder until the repository assigns the
    /// next per-project value inside the insert transaction.
    pub fn new(title: String, project_id: ProjectId, creator: String, now: i64) -> Self {
        Self {
            id: TicketId::new(),
            ticket_number: 0,
            title,
            description: None,
            position: 0,
            type_id: None,
            status_id: None,
            project_id,
            assignee: None,
            estimation: 0,
            story_points: 0,
            creator,
            created: now,
            modified: now,
            deleted: false,
        }
    }

    /// Validates creation rules.
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.title.trim().is_empty() {
            return Err(TrackError::missing_data("title"));
        }
        if self.creator.trim().is_empty() {
            return Err(TrackError::missing_data("creator"));
        }
        Ok(())
    }
}

/// Optional filters accepted by ticket listing.
///
/// Unknown filter fields in the request are ignored before this struct is
/// built, so every field here is a recognized filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilter {
    pub project_id: Option<ProjectId>,
    pub status_id: Option<String>,
    pub assignee: Option<String>,
}

impl TicketFilter {
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none() && self.status_id.is_none() && self.assignee.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ticket_stamps_timestamps() {
        let ticket = Ticket::new("Fix login".into(), ProjectId::new(), "alice".into(), 1_700_000_000);
        assert_eq!(ticket.created, 1_700_000_000);
        assert_eq!(ticket.modified, 1_700_000_000);
        assert!(!ticket.deleted);
        assert_eq!(ticket.ticket_number, 0);
    }

    #[test]
    fn test_validate_requires_title() {
        let ticket = Ticket::new("".into(), ProjectId::new(), "alice".into(), 0);
        assert!(matches!(ticket.validate(), Err(TrackError::MissingData(_))));
    }
}
