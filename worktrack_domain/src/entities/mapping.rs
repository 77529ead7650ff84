// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Many-to-Many Mapping Entities
//!
//! Every mapping table shares one row shape ([`MappingRecord`]) and one set
//! of semantics: at most one live row per (left, right) pair, idempotent
//! attach/detach through soft delete, and `created DESC` listing. The
//! [`MappingKind`] descriptor names the table and the two endpoint families
//! so the service layer can verify both sides exist before attaching.
//!
//! Attach on an existing live pair is `EntityAlreadyExists`; attach after a
//! detach restores the soft-deleted row with fresh timestamps.

use serde::{Deserialize, Serialize};

use super::labeled::LabeledKind;
use crate::value_objects::MappingId;

/// The family an endpoint id belongs to, used for existence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointFamily {
    Labeled(LabeledKind),
    Ticket,
    Project,
    Cycle,
    Document,
    DocumentVersion,
    Comment,
    User,
    /// An arbitrary entity reference; only the id shape is checked.
    Any,
}

impl EndpointFamily {
    /// The storage table for this family, when one exists.
    pub fn table(&self) -> Option<&'static str> {
        match self {
            EndpointFamily::Labeled(kind) => Some(kind.table()),
            EndpointFamily::Ticket => Some("tickets"),
            EndpointFamily::Project => Some("projects"),
            EndpointFamily::Cycle => Some("cycles"),
            EndpointFamily::Document => Some("documents"),
            EndpointFamily::DocumentVersion => Some("document_versions"),
            EndpointFamily::Comment => Some("comments"),
            EndpointFamily::User => Some("users"),
            EndpointFamily::Any => None,
        }
    }

    /// Short name for error messages ("label", "ticket", …).
    pub fn name(&self) -> &'static str {
        match self {
            EndpointFamily::Labeled(kind) => kind.object_type(),
            EndpointFamily::Ticket => "ticket",
            EndpointFamily::Project => "project",
            EndpointFamily::Cycle => "cycle",
            EndpointFamily::Document => "document",
            EndpointFamily::DocumentVersion => "documentVersion",
            EndpointFamily::Comment => "comment",
            EndpointFamily::User => "user",
            EndpointFamily::Any => "entity",
        }
    }
}

/// The closed set of mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    /// cycle ↔ project
    CycleProject,
    /// ticket ↔ cycle
    TicketCycle,
    /// label ↔ ticket
    LabelTicket,
    /// component ↔ ticket
    ComponentTicket,
    /// asset ↔ ticket
    AssetTicket,
    /// label ↔ label category
    LabelCategory,
    /// document ↔ arbitrary entity
    DocumentEntityLink,
    /// user ↔ ticket (votes)
    Vote,
    /// document tag ↔ document
    DocumentTagDocument,
    /// comment ↔ ticket
    CommentTicket,
    /// comment ↔ document
    CommentDocument,
    /// label ↔ document
    LabelDocument,
    /// label ↔ document version (version annotations)
    LabelDocumentVersion,
    /// comment ↔ document version (version annotations)
    CommentDocumentVersion,
}

impl MappingKind {
    pub const ALL: [MappingKind; 14] = [
        MappingKind::CycleProject,
        MappingKind::TicketCycle,
        MappingKind::LabelTicket,
        MappingKind::ComponentTicket,
        MappingKind::AssetTicket,
        MappingKind::LabelCategory,
        MappingKind::DocumentEntityLink,
        MappingKind::Vote,
        MappingKind::DocumentTagDocument,
        MappingKind::CommentTicket,
        MappingKind::CommentDocument,
        MappingKind::LabelDocument,
        MappingKind::LabelDocumentVersion,
        MappingKind::CommentDocumentVersion,
    ];

    /// The storage table backing this mapping.
    pub fn table(&self) -> &'static str {
        match self {
            MappingKind::CycleProject => "cycle_projects",
            MappingKind::TicketCycle => "ticket_cycles",
            MappingKind::LabelTicket => "label_tickets",
            MappingKind::ComponentTicket => "component_tickets",
            MappingKind::AssetTicket => "asset_tickets",
            MappingKind::LabelCategory => "label_category_mappings",
            MappingKind::DocumentEntityLink => "document_entity_links",
            MappingKind::Vote => "vote_mappings",
            MappingKind::DocumentTagDocument => "document_tag_mappings",
            MappingKind::CommentTicket => "comment_ticket_mappings",
            MappingKind::CommentDocument => "comment_document_mappings",
            MappingKind::LabelDocument => "label_document_mappings",
            MappingKind::LabelDocumentVersion => "label_document_version_mappings",
            MappingKind::CommentDocumentVersion => "comment_document_version_mappings",
        }
    }

    /// Object type string used in events for this mapping.
    pub fn object_type(&self) -> &'static str {
        match self {
            MappingKind::CycleProject => "cycleProject",
            MappingKind::TicketCycle => "ticketCycle",
            MappingKind::LabelTicket => "labelTicket",
            MappingKind::ComponentTicket => "componentTicket",
            MappingKind::AssetTicket => "assetTicket",
            MappingKind::LabelCategory => "labelCategory",
            MappingKind::DocumentEntityLink => "documentEntityLink",
            MappingKind::Vote => "vote",
            MappingKind::DocumentTagDocument => "documentTagMapping",
            MappingKind::CommentTicket => "commentTicket",
            MappingKind::CommentDocument => "commentDocument",
            MappingKind::LabelDocument => "labelDocument",
            MappingKind::LabelDocumentVersion => "labelDocumentVersion",
            MappingKind::CommentDocumentVersion => "commentDocumentVersion",
        }
    }

    /// The family of the left endpoint.
    pub fn left(&self) -> EndpointFamily {
        match self {
            MappingKind::CycleProject => EndpointFamily::Cycle,
            MappingKind::TicketCycle => EndpointFamily::Ticket,
            MappingKind::LabelTicket => EndpointFamily::Labeled(LabeledKind::Label),
            MappingKind::ComponentTicket => EndpointFamily::Labeled(LabeledKind::Component),
            MappingKind::AssetTicket => EndpointFamily::Labeled(LabeledKind::Asset),
            MappingKind::LabelCategory => EndpointFamily::Labeled(LabeledKind::Label),
            MappingKind::DocumentEntityLink => EndpointFamily::Document,
            MappingKind::Vote => EndpointFamily::User,
            MappingKind::DocumentTagDocument => EndpointFamily::Labeled(LabeledKind::DocumentTag),
            MappingKind::CommentTicket => EndpointFamily::Comment,
            MappingKind::CommentDocument => EndpointFamily::Comment,
            MappingKind::LabelDocument => EndpointFamily::Labeled(LabeledKind::Label),
            MappingKind::LabelDocumentVersion => EndpointFamily::Labeled(LabeledKind::Label),
            MappingKind::CommentDocumentVersion => EndpointFamily::Comment,
        }
    }

    /// The family of the right endpoint.
    pub fn right(&self) -> EndpointFamily {
        match self {
            MappingKind::CycleProject => EndpointFamily::Project,
            MappingKind::TicketCycle => EndpointFamily::Cycle,
            MappingKind::LabelTicket => EndpointFamily::Ticket,
            MappingKind::ComponentTicket => EndpointFamily::Ticket,
            MappingKind::AssetTicket => EndpointFamily::Ticket,
            MappingKind::LabelCategory => EndpointFamily::Labeled(LabeledKind::LabelCategory),
            MappingKind::DocumentEntityLink => EndpointFamily::Any,
            MappingKind::Vote => EndpointFamily::Ticket,
            MappingKind::DocumentTagDocument => EndpointFamily::Document,
            MappingKind::CommentTicket => EndpointFamily::Ticket,
            MappingKind::CommentDocument => EndpointFamily::Document,
            MappingKind::LabelDocument => EndpointFamily::Document,
            MappingKind::LabelDocumentVersion => EndpointFamily::DocumentVersion,
            MappingKind::CommentDocumentVersion => EndpointFamily::DocumentVersion,
        }
    }

    /// The envelope field carrying the left id ("cycleId", "labelId", …).
    pub fn left_field(&self) -> &'static str {
        match self {
            MappingKind::CycleProject => "cycleId",
            MappingKind::TicketCycle => "ticketId",
            MappingKind::LabelTicket => "labelId",
            MappingKind::ComponentTicket => "componentId",
            MappingKind::AssetTicket => "assetId",
            MappingKind::LabelCategory => "labelId",
            MappingKind::DocumentEntityLink => "documentId",
            MappingKind::Vote => "userId",
            MappingKind::DocumentTagDocument => "tagId",
            MappingKind::CommentTicket => "commentId",
            MappingKind::CommentDocument => "commentId",
            MappingKind::LabelDocument => "labelId",
            MappingKind::LabelDocumentVersion => "labelId",
            MappingKind::CommentDocumentVersion => "commentId",
        }
    }

    /// The envelope field carrying the right id.
    pub fn right_field(&self) -> &'static str {
        match self {
            MappingKind::CycleProject => "projectId",
            MappingKind::TicketCycle => "cycleId",
            MappingKind::LabelTicket => "ticketId",
            MappingKind::ComponentTicket => "ticketId",
            MappingKind::AssetTicket => "ticketId",
            MappingKind::LabelCategory => "categoryId",
            MappingKind::DocumentEntityLink => "entityId",
            MappingKind::Vote => "ticketId",
            MappingKind::DocumentTagDocument => "documentId",
            MappingKind::CommentTicket => "ticketId",
            MappingKind::CommentDocument => "documentId",
            MappingKind::LabelDocument => "documentId",
            MappingKind::LabelDocumentVersion => "versionId",
            MappingKind::CommentDocumentVersion => "versionId",
        }
    }
}

/// One mapping row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub id: MappingId,
    pub left_id: String,
    pub right_id: String,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl MappingRecord {
    pub fn new(left_id: String, right_id: String, now: i64) -> Self {
        Self {
            id: MappingId::new(),
            left_id,
            right_id,
            created: now,
            modified: now,
            deleted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_distinct_table() {
        let mut tables: Vec<_> = MappingKind::ALL.iter().map(|k| k.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), MappingKind::ALL.len());
    }

    #[test]
    fn test_endpoint_families_resolve_tables() {
        assert_eq!(MappingKind::LabelTicket.left().table(), Some("labels"));
        assert_eq!(MappingKind::LabelTicket.right().table(), Some("tickets"));
        assert_eq!(MappingKind::DocumentEntityLink.right().table(), None);
    }

    #[test]
    fn test_field_names_differ_within_kind() {
        for kind in MappingKind::ALL {
            assert_ne!(kind.left_field(), kind.right_field(), "{kind:?}");
        }
    }
}
