// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Comment and mention entities.
//!
//! Comments attach to tickets or documents through mapping rows. Mentions are
//! extracted per mentioned user; at most one live mention per (comment, user)
//! pair.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::{CommentId, MentionId, UserId};

/// A comment body authored by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    /// Username of the author.
    pub author: String,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl Comment {
    pub fn new(body: String, author: String, now: i64) -> Self {
        Self {
            id: CommentId::new(),
            body,
            author,
            created: now,
            modified: now,
            deleted: false,
        }
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if self.body.trim().is_empty() {
            return Err(TrackError::missing_data("body"));
        }
        Ok(())
    }
}

/// A user mentioned in a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    pub id: MentionId,
    pub comment_id: CommentId,
    pub user_id: UserId,
    pub created: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl Mention {
    pub fn new(comment_id: CommentId, user_id: UserId, now: i64) -> Self {
        Self {
            id: MentionId::new(),
            comment_id,
            user_id,
            created: now,
            deleted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_body_is_missing_data() {
        let comment = Comment::new("\n".into(), "alice".into(), 0);
        assert!(matches!(comment.validate(), Err(TrackError::MissingData(_))));
    }
}
