// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Change Events
//!
//! After every successful mutation exactly one [`ChangeEvent`] is published.
//! The event carries the entity context the push hub needs for filtering:
//! the object type and entity id for subscription matching, and a
//! [`EventContext`] with scoping ids plus the permission tags a subscriber
//! must pass before delivery.
//!
//! Payloads are restricted to non-sensitive fields: the entity id plus the
//! key changed fields. Secrets (password hashes, tokens) never enter a
//! payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value_objects::EventId;

/// The action class of a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionClass {
    Create,
    Modify,
    Remove,
}

impl ActionClass {
    pub fn name(&self) -> &'static str {
        match self {
            ActionClass::Create => "create",
            ActionClass::Modify => "modify",
            ActionClass::Remove => "remove",
        }
    }
}

/// Scoping ids and required permission tags attached to an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Permission tags every subscriber must pass for delivery.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

impl EventContext {
    pub fn with_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }

    pub fn require(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }
}

/// One published change, delivered to matching subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub id: EventId,
    /// Unix seconds at publish time.
    pub timestamp: i64,
    pub action: ActionClass,
    /// Short string identifying the entity family ("ticket", "cycle", …).
    pub object_type: String,
    pub entity_id: String,
    /// Username that initiated the change.
    pub actor: String,
    /// Entity id plus key changed fields; never secrets.
    pub payload: Map<String, Value>,
    #[serde(default)]
    pub context: EventContext,
}

impl ChangeEvent {
    pub fn new(
        action: ActionClass,
        object_type: impl Into<String>,
        entity_id: impl Into<String>,
        actor: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: EventId::new(),
            timestamp,
            action,
            object_type: object_type.into(),
            entity_id: entity_id.into(),
            actor: actor.into(),
            payload: Map::new(),
            context: EventContext::default(),
        }
    }

    /// Adds a payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Attaches the event context.
    pub fn with_context(mut self, context: EventContext) -> Self {
        self.context = context;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_class_names() {
        assert_eq!(ActionClass::Create.name(), "create");
        assert_eq!(ActionClass::Modify.name(), "modify");
        assert_eq!(ActionClass::Remove.name(), "remove");
    }

    #[test]
    fn test_builder_accumulates_payload() {
        let event = ChangeEvent::new(ActionClass::Create, "ticket", "t-1", "alice", 100)
            .with_field("title", Value::String("Fix login".into()))
            .with_context(EventContext::with_project("p-1").require("ticket:read"));

        assert_eq!(event.payload["title"], "Fix login");
        assert_eq!(event.context.project_id.as_deref(), Some("p-1"));
        assert_eq!(event.context.permissions, vec!["ticket:read"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let event = ChangeEvent::new(ActionClass::Remove, "label", "l-1", "bob", 7);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["objectType"], "label");
        assert_eq!(json["entityId"], "l-1");
        assert_eq!(json["action"], "remove");
    }
}
