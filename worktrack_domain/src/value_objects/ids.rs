// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-family identifier aliases.
//!
//! One category type per persisted aggregate family, so ids from different
//! families cannot be mixed at compile time. Mapping rows and the simple
//! labeled family share a category each; their concrete table is carried by
//! the accompanying kind descriptor, not the id type.

use super::entity_id::{EntityId, IdCategory};

macro_rules! declare_id_category {
    ($(#[$doc:meta])* $category:ident, $alias:ident, $name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $category;

        impl IdCategory for $category {
            fn category_name() -> &'static str {
                $name
            }
        }

        $(#[$doc])*
        pub type $alias = EntityId<$category>;
    };
}

declare_id_category!(
    /// Identifier for user accounts.
    UserIdCategory, UserId, "user"
);
declare_id_category!(
    /// Identifier for tickets.
    TicketIdCategory, TicketId, "ticket"
);
declare_id_category!(
    /// Identifier for projects.
    ProjectIdCategory, ProjectId, "project"
);
declare_id_category!(
    /// Identifier for cycles (sprints, milestones, releases).
    CycleIdCategory, CycleId, "cycle"
);
declare_id_category!(
    /// Identifier for documents.
    DocumentIdCategory, DocumentId, "document"
);
declare_id_category!(
    /// Identifier for document content rows.
    DocumentContentIdCategory, DocumentContentId, "document_content"
);
declare_id_category!(
    /// Identifier for attachments.
    AttachmentIdCategory, AttachmentId, "attachment"
);
declare_id_category!(
    /// Identifier for comments.
    CommentIdCategory, CommentId, "comment"
);
declare_id_category!(
    /// Identifier for mention rows.
    MentionIdCategory, MentionId, "mention"
);
declare_id_category!(
    /// Identifier for the simple labeled entity family (labels, components,
    /// assets, ticket types, priorities, …). The concrete kind travels with
    /// the record, not the id.
    LabeledIdCategory, LabeledId, "labeled"
);
declare_id_category!(
    /// Identifier for many-to-many mapping rows.
    MappingIdCategory, MappingId, "mapping"
);
declare_id_category!(
    /// Identifier for metadata rows.
    MetadataIdCategory, MetadataId, "metadata"
);
declare_id_category!(
    /// Identifier for published change events.
    EventIdCategory, EventId, "event"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_named() {
        assert_eq!(TicketId::new().category(), "ticket");
        assert_eq!(ProjectId::new().category(), "project");
        assert_eq!(MappingId::new().category(), "mapping");
    }
}
