// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Subscription filters for the push channel.
//!
//! A subscriber declares the entity types it wants, optionally a closed set
//! of entity ids, and optionally context ids (project / organization / team /
//! account). Empty collections are open: an empty type list matches every
//! type, an empty id set matches every id. A context id, when set, must
//! equal the event's.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use worktrack_domain::ChangeEvent;

/// What a push subscriber wants delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionFilter {
    /// Entity families of interest; empty = all.
    pub entity_types: HashSet<String>,
    /// Specific entity ids; empty = open.
    pub entity_ids: HashSet<String>,
    pub project_id: Option<String>,
    pub organization_id: Option<String>,
    pub team_id: Option<String>,
    pub account_id: Option<String>,
}

impl SubscriptionFilter {
    /// Does this filter match the event?
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        if !self.entity_types.is_empty() && !self.entity_types.contains(&event.object_type) {
            return false;
        }
        if !self.entity_ids.is_empty() && !self.entity_ids.contains(&event.entity_id) {
            return false;
        }
        if let Some(project_id) = &self.project_id {
            if event.context.project_id.as_ref() != Some(project_id) {
                return false;
            }
        }
        if let Some(organization_id) = &self.organization_id {
            if event.context.organization_id.as_ref() != Some(organization_id) {
                return false;
            }
        }
        if let Some(team_id) = &self.team_id {
            if event.context.team_id.as_ref() != Some(team_id) {
                return false;
            }
        }
        if let Some(account_id) = &self.account_id {
            if event.context.account_id.as_ref() != Some(account_id) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worktrack_domain::{ActionClass, EventContext};

    fn event(object_type: &str, entity_id: &str) -> ChangeEvent {
        ChangeEvent::new(ActionClass::Create, object_type, entity_id, "alice", 1)
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = SubscriptionFilter::default();
        assert!(filter.matches(&event("ticket", "t-1")));
        assert!(filter.matches(&event("label", "l-1")));
    }

    #[test]
    fn test_type_filter() {
        let filter = SubscriptionFilter {
            entity_types: ["ticket".to_string()].into(),
            ..SubscriptionFilter::default()
        };
        assert!(filter.matches(&event("ticket", "t-1")));
        assert!(!filter.matches(&event("label", "l-1")));
    }

    #[test]
    fn test_id_filter() {
        let filter = SubscriptionFilter {
            entity_ids: ["t-1".to_string()].into(),
            ..SubscriptionFilter::default()
        };
        assert!(filter.matches(&event("ticket", "t-1")));
        assert!(!filter.matches(&event("ticket", "t-2")));
    }

    #[test]
    fn test_project_scope() {
        let filter = SubscriptionFilter {
            project_id: Some("p-1".into()),
            ..SubscriptionFilter::default()
        };

        let mut scoped = event("ticket", "t-1");
        scoped.context = EventContext::with_project("p-1");
        assert!(filter.matches(&scoped));

        let mut other = event("ticket", "t-1");
        other.context = EventContext::with_project("p-2");
        assert!(!filter.matches(&other));

        // Events without project context do not match a project-scoped filter.
        assert!(!filter.matches(&event("ticket", "t-1")));
    }

    #[test]
    fn test_frame_deserializes_camel_case() {
        let filter: SubscriptionFilter =
            serde_json::from_str(r#"{"entityTypes": ["ticket"], "projectId": "p-1"}"#).unwrap();
        assert!(filter.entity_types.contains("ticket"));
        assert_eq!(filter.project_id.as_deref(), Some("p-1"));
    }
}
