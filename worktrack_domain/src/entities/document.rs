// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Entities
//!
//! Documents, their versioned content stream, and the per-version snapshot
//! rows.
//!
//! A document's `version` starts at 1 and advances by exactly one with every
//! content update. Each update inserts one [`DocumentContent`] row whose
//! version equals the new document version, plus one [`DocumentVersion`]
//! snapshot for the history stream. The version bump is guarded by an
//! optimistic check in storage (`UPDATE … WHERE version = ?`), so concurrent
//! updates over the same document resolve to exactly one winner and one
//! `VersionConflict`.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::{DocumentContentId, DocumentId, ProjectId};

/// Default content type for new content rows.
pub const DEFAULT_CONTENT_TYPE: &str = "markdown";

/// A versioned document in a document space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    /// Document space id (simple labeled entity).
    pub space_id: String,
    /// Document type id (simple labeled entity).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<String>,
    /// Username of the creator.
    pub creator: String,
    /// Monotonic content version, >= 1.
    pub version: i64,
    /// Self-referential tree parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<DocumentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub position: i64,
    pub published: bool,
    pub archived: bool,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl Document {
    pub fn new(title: String, space_id: String, creator: String, now: i64) -> Self {
        Self {
            id: DocumentId::new(),
            title,
            space_id,
            type_id: None,
            creator,
            version: 1,
            parent_id: None,
            project_id: None,
            position: 0,
            published: false,
            archived: false,
            created: now,
            modified: now,
            deleted: false,
        }
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if self.title.trim().is_empty() {
            return Err(TrackError::missing_data("title"));
        }
        if self.space_id.trim().is_empty() {
            return Err(TrackError::missing_data("spaceId"));
        }
        if self.version < 1 {
            return Err(TrackError::invalid_data("document version must be >= 1"));
        }
        Ok(())
    }
}

/// One content row of a document's version stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContent {
    pub id: DocumentContentId,
    pub document_id: DocumentId,
    /// Equals the document version at insert time.
    pub version: i64,
    pub content_type: String,
    pub content: String,
    pub created: i64,
}

impl DocumentContent {
    pub fn new(document_id: DocumentId, version: i64, content: String, content_type: Option<String>, now: i64) -> Self {
        Self {
            id: DocumentContentId::new(),
            document_id,
            version,
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            content,
            created: now,
        }
    }
}

/// A history snapshot tied to one version of a document.
///
/// Annotations on a version (labels, tags, comments) ride the generic
/// mapping machinery against these snapshot rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    pub id: String,
    pub document_id: DocumentId,
    pub version: i64,
    /// Username that produced this version.
    pub created_by: String,
    pub created: i64,
}
