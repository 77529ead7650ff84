// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Simple Labeled Entity Family
//!
//! Nine entity families share one shape: an id, a required title, an optional
//! description, soft-delete discipline, and at most a couple of
//! kind-specific attributes. Rather than nine near-identical modules, the
//! family is expressed once as [`LabeledRecord`] plus the [`LabeledKind`]
//! descriptor that names the table, the object type used in events, the list
//! ordering, and which extra attributes apply.
//!
//! The kinds:
//!
//! | Kind | Extra attributes |
//! |---|---|
//! | Label | color |
//! | LabelCategory | — |
//! | Component | — |
//! | Asset | — |
//! | TicketType | icon, color |
//! | Priority | level (1..5, required) |
//! | RelationshipType | — |
//! | DocumentTag | — |
//! | DocumentSpace | — |
//! | DocumentTemplate | — |

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::{LabeledId, PriorityLevel};

/// The closed set of simple labeled entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabeledKind {
    Label,
    LabelCategory,
    Component,
    Asset,
    TicketType,
    Priority,
    RelationshipType,
    DocumentTag,
    DocumentSpace,
    DocumentTemplate,
}

/// List ordering policy for a labeled kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabeledOrder {
    /// `title ASC` — the default for labeled entities.
    TitleAsc,
    /// `level ASC` — priorities order by their level.
    LevelAsc,
}

impl LabeledKind {
    /// All kinds, for registration loops.
    pub const ALL: [LabeledKind; 10] = [
        LabeledKind::Label,
        LabeledKind::LabelCategory,
        LabeledKind::Component,
        LabeledKind::Asset,
        LabeledKind::TicketType,
        LabeledKind::Priority,
        LabeledKind::RelationshipType,
        LabeledKind::DocumentTag,
        LabeledKind::DocumentSpace,
        LabeledKind::DocumentTemplate,
    ];

    /// The storage table backing this kind.
    pub fn table(&self) -> &'static str {
        match self {
            LabeledKind::Label => "labels",
            LabeledKind::LabelCategory => "label_categories",
            LabeledKind::Component => "components",
            LabeledKind::Asset => "assets",
            LabeledKind::TicketType => "ticket_types",
            LabeledKind::Priority => "priorities",
            LabeledKind::RelationshipType => "relationship_types",
            LabeledKind::DocumentTag => "document_tags",
            LabeledKind::DocumentSpace => "document_spaces",
            LabeledKind::DocumentTemplate => "document_templates",
        }
    }

    /// The object type string carried in events and action tags.
    pub fn object_type(&self) -> &'static str {
        match self {
            LabeledKind::Label => "label",
            LabeledKind::LabelCategory => "labelCategory",
            LabeledKind::Component => "component",
            LabeledKind::Asset => "asset",
            LabeledKind::TicketType => "ticketType",
            LabeledKind::Priority => "priority",
            LabeledKind::RelationshipType => "relationshipType",
            LabeledKind::DocumentTag => "documentTag",
            LabeledKind::DocumentSpace => "documentSpace",
            LabeledKind::DocumentTemplate => "documentTemplate",
        }
    }

    /// List ordering for this kind.
    pub fn ordering(&self) -> LabeledOrder {
        match self {
            LabeledKind::Priority => LabeledOrder::LevelAsc,
            _ => LabeledOrder::TitleAsc,
        }
    }

    /// Whether this kind requires a level attribute.
    pub fn requires_level(&self) -> bool {
        matches!(self, LabeledKind::Priority)
    }

    /// Whether this kind carries icon / color decoration.
    pub fn decorated(&self) -> bool {
        matches!(self, LabeledKind::TicketType | LabeledKind::Label)
    }

    /// Looks a kind up by its object type string.
    pub fn from_object_type(s: &str) -> Option<LabeledKind> {
        LabeledKind::ALL.iter().copied().find(|k| k.object_type() == s)
    }
}

/// One row of the simple labeled family.
///
/// Attributes that do not apply to the record's kind stay `None`; the
/// validation in [`LabeledRecord::validate_for`] enforces the kind rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabeledRecord {
    pub id: LabeledId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<PriorityLevel>,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl LabeledRecord {
    /// Creates a new record with server-assigned identity and timestamps.
    pub fn new(title: String, now: i64) -> Self {
        Self {
            id: LabeledId::new(),
            title,
            description: None,
            icon: None,
            color: None,
            level: None,
            created: now,
            modified: now,
            deleted: false,
        }
    }

    /// Validates the record against the rules of `kind`.
    ///
    /// Title must be non-empty for every kind; priorities must carry a level.
    pub fn validate_for(&self, kind: LabeledKind) -> Result<(), TrackError> {
        if self.title.trim().is_empty() {
            return Err(TrackError::missing_data("title"));
        }
        if kind.requires_level() && self.level.is_none() {
            return Err(TrackError::missing_data("level"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_distinct_table() {
        let mut tables: Vec<_> = LabeledKind::ALL.iter().map(|k| k.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), LabeledKind::ALL.len());
    }

    #[test]
    fn test_object_type_round_trip() {
        for kind in LabeledKind::ALL {
            assert_eq!(LabeledKind::from_object_type(kind.object_type()), Some(kind));
        }
        assert_eq!(LabeledKind::from_object_type("nope"), None);
    }

    #[test]
    fn test_priority_requires_level() {
        let record = LabeledRecord::new("Urgent".into(), 1_700_000_000);
        assert!(matches!(
            record.validate_for(LabeledKind::Priority),
            Err(TrackError::MissingData(_))
        ));

        let mut with_level = record.clone();
        with_level.level = Some(PriorityLevel::new(1).unwrap());
        assert!(with_level.validate_for(LabeledKind::Priority).is_ok());
    }

    #[test]
    fn test_empty_title_is_missing_data() {
        let record = LabeledRecord::new("  ".into(), 0);
        assert!(matches!(
            record.validate_for(LabeledKind::Label),
            Err(TrackError::MissingData(_))
        ));
    }

    #[test]
    fn test_priority_orders_by_level() {
        assert_eq!(LabeledKind::Priority.ordering(), LabeledOrder::LevelAsc);
        assert_eq!(LabeledKind::Label.ordering(), LabeledOrder::TitleAsc);
    }
}
