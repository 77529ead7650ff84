// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Attachment entity.
//!
//! Binary payloads live outside the row store; the entity records the storage
//! path, mime, size, and a SHA-256 checksum computed server-side at create.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::{AttachmentId, DocumentId};

/// A file attached to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    pub document_id: DocumentId,
    pub filename: String,
    pub original_filename: String,
    pub mime: String,
    pub size: i64,
    pub storage_path: String,
    /// Hex-encoded SHA-256 of the payload.
    pub checksum: String,
    /// Username of the uploader.
    pub uploader: String,
    /// Document version the attachment was added at.
    pub version: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl Attachment {
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.filename.trim().is_empty() {
            return Err(TrackError::missing_data("filename"));
        }
        if self.size < 0 {
            return Err(TrackError::invalid_data("attachment size cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_size_is_invalid() {
        let att = Attachment {
            id: AttachmentId::new(),
            document_id: DocumentId::new(),
            filename: "a.png".into(),
            original_filename: "a.png".into(),
            mime: "image/png".into(),
            size: -1,
            storage_path: "/tmp/a".into(),
            checksum: String::new(),
            uploader: "alice".into(),
            version: 1,
            description: None,
            created: 0,
            modified: 0,
            deleted: false,
        };
        assert!(matches!(att.validate(), Err(TrackError::InvalidData(_))));
    }
}
