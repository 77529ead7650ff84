// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Comment and mention repository.
//!
//! Mentions hold a partial unique index on (comment, user) among live rows;
//! re-mentioning after a delete restores the row. A comment created together
//! with its anchor mappings and mentions goes through
//! [`CommentRepository::insert_anchored`], one transaction for the whole
//! compound write.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::{Comment, MappingKind, MappingRecord, Mention};
use worktrack_domain::value_objects::{CommentId, MentionId, UserId};
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct CommentRepository {
    store: SqliteStore,
}

fn row_to_comment(row: &SqliteRow) -> Result<Comment, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;

    Ok(Comment {
        id: CommentId::from_string(&id).map_err(|_| TrackError::database_error(format!("corrupt comment id: {id}")))?,
        body: row.try_get("body").map_err(classify_db_error)?,
        author: row.try_get("author").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

fn row_to_mention(row: &SqliteRow) -> Result<Mention, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;
    let comment_id: String = row.try_get("comment_id").map_err(classify_db_error)?;
    let user_id: String = row.try_get("user_id").map_err(classify_db_error)?;

    Ok(Mention {
        id: MentionId::from_string(&id).map_err(|_| TrackError::database_error(format!("corrupt mention id: {id}")))?,
        comment_id: CommentId::from_string(&comment_id)
            .map_err(|_| TrackError::database_error(format!("corrupt comment id: {comment_id}")))?,
        user_id: UserId::from_string(&user_id)
            .map_err(|_| TrackError::database_error(format!("corrupt user id: {user_id}")))?,
        created: row.try_get("created").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl CommentRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub async fn insert(&self, comment: &Comment) -> Result<(), TrackError> {
        sqlx::query("INSERT INTO comments (id, body, author, created, modified, deleted) VALUES (?, ?, ?, ?, ?, 0)")
            .bind(comment.id.to_string())
            .bind(&comment.body)
            .bind(&comment.author)
            .bind(comment.created)
            .bind(comment.modified)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(())
    }

    /// Inserts a comment together with its anchor mappings and mentions.
    ///
    /// The whole compound write runs in one transaction: a failure on any
    /// row leaves no comment, mapping, or mention behind. The comment is
    /// new, so the anchors and mentions are plain inserts; the caller
    /// verifies the anchor endpoints and mention users exist beforehand.
    pub async fn insert_anchored(
        &self,
        comment: &Comment,
        anchors: &[(MappingKind, MappingRecord)],
        mentions: &[Mention],
    ) -> Result<(), TrackError> {
        let mut tx = self.store.pool().begin().await.map_err(classify_db_error)?;

        sqlx::query("INSERT INTO comments (id, body, author, created, modified, deleted) VALUES (?, ?, ?, ?, ?, 0)")
            .bind(comment.id.to_string())
            .bind(&comment.body)
            .bind(&comment.author)
            .bind(comment.created)
            .bind(comment.modified)
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        for (kind, record) in anchors {
            let sql = format!(
                "INSERT INTO {} (id, left_id, right_id, created, modified, deleted) VALUES (?, ?, ?, ?, ?, 0)",
                kind.table()
            );
            sqlx::query(&sql)
                .bind(record.id.to_string())
                .bind(&record.left_id)
                .bind(&record.right_id)
                .bind(record.created)
                .bind(record.modified)
                .execute(&mut *tx)
                .await
                .map_err(classify_db_error)?;
        }

        for mention in mentions {
            sqlx::query("INSERT INTO mentions (id, comment_id, user_id, created, deleted) VALUES (?, ?, ?, ?, 0)")
                .bind(mention.id.to_string())
                .bind(mention.comment_id.to_string())
                .bind(mention.user_id.to_string())
                .bind(mention.created)
                .execute(&mut *tx)
                .await
                .map_err(classify_db_error)?;
        }

        tx.commit().await.map_err(classify_db_error)?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Comment>, TrackError> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_comment).transpose()
    }

    pub async fn update(&self, comment: &Comment) -> Result<bool, TrackError> {
        let result = sqlx::query("UPDATE comments SET body = ?, modified = ? WHERE id = ? AND deleted = 0")
            .bind(&comment.body)
            .bind(comment.modified)
            .bind(comment.id.to_string())
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: &str, now: i64) -> Result<bool, TrackError> {
        let result = sqlx::query("UPDATE comments SET deleted = 1, modified = ? WHERE id = ? AND deleted = 0")
            .bind(now)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, TrackError> {
        let row = sqlx::query("SELECT 1 FROM comments WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;
        Ok(row.is_some())
    }

    /// Records a mention, restoring a soft-deleted pair when present.
    ///
    /// A live duplicate is `EntityAlreadyExists`. Returns the live row.
    pub async fn insert_mention(&self, mention: &Mention) -> Result<Mention, TrackError> {
        let existing = sqlx::query("SELECT id, deleted FROM mentions WHERE comment_id = ? AND user_id = ?")
            .bind(mention.comment_id.to_string())
            .bind(mention.user_id.to_string())
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        if let Some(row) = existing {
            let deleted: i64 = row.try_get("deleted").map_err(classify_db_error)?;
            if deleted == 0 {
                return Err(TrackError::already_exists("user already mentioned in this comment"));
            }
            let id: String = row.try_get("id").map_err(classify_db_error)?;
            sqlx::query("UPDATE mentions SET deleted = 0, created = ? WHERE id = ?")
                .bind(mention.created)
                .bind(&id)
                .execute(self.store.pool())
                .await
                .map_err(classify_db_error)?;

            return Ok(Mention {
                id: MentionId::from_string(&id)
                    .map_err(|_| TrackError::database_error(format!("corrupt mention id: {id}")))?,
                comment_id: mention.comment_id,
                user_id: mention.user_id,
                created: mention.created,
                deleted: false,
            });
        }

        sqlx::query("INSERT INTO mentions (id, comment_id, user_id, created, deleted) VALUES (?, ?, ?, ?, 0)")
            .bind(mention.id.to_string())
            .bind(mention.comment_id.to_string())
            .bind(mention.user_id.to_string())
            .bind(mention.created)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(mention.clone())
    }

    /// Soft-deletes the live mention for (comment, user); false when absent.
    pub async fn remove_mention(&self, comment_id: &str, user_id: &str) -> Result<bool, TrackError> {
        let result = sqlx::query("UPDATE mentions SET deleted = 1 WHERE comment_id = ? AND user_id = ? AND deleted = 0")
            .bind(comment_id)
            .bind(user_id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_mentions(&self, comment_id: &str) -> Result<Vec<Mention>, TrackError> {
        let rows = sqlx::query("SELECT * FROM mentions WHERE comment_id = ? AND deleted = 0 ORDER BY created DESC")
            .bind(comment_id)
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_mention).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duplicate_live_mention_conflicts() {
        let repo = CommentRepository::new(SqliteStore::in_memory().await.unwrap());
        let comment = Comment::new("hi @alice".into(), "bob".into(), 1);
        repo.insert(&comment).await.unwrap();

        let user = UserId::new();
        repo.insert_mention(&Mention::new(comment.id, user, 1)).await.unwrap();

        let err = repo.insert_mention(&Mention::new(comment.id, user, 2)).await.unwrap_err();
        assert!(matches!(err, TrackError::EntityAlreadyExists(_)));

        // Distinct user is fine.
        repo.insert_mention(&Mention::new(comment.id, UserId::new(), 3)).await.unwrap();
        assert_eq!(repo.list_mentions(&comment.id.to_string()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_then_mention_again_restores_row() {
        let repo = CommentRepository::new(SqliteStore::in_memory().await.unwrap());
        let comment = Comment::new("ping".into(), "bob".into(), 1);
        repo.insert(&comment).await.unwrap();

        let user = UserId::new();
        let first = repo.insert_mention(&Mention::new(comment.id, user, 1)).await.unwrap();

        assert!(repo
            .remove_mention(&comment.id.to_string(), &user.to_string())
            .await
            .unwrap());
        assert!(repo.list_mentions(&comment.id.to_string()).await.unwrap().is_empty());
        assert!(!repo
            .remove_mention(&comment.id.to_string(), &user.to_string())
            .await
            .unwrap());

        // Re-mention revives the same row with a fresh timestamp.
        let revived = repo.insert_mention(&Mention::new(comment.id, user, 9)).await.unwrap();
        assert_eq!(revived.id, first.id);
        assert_eq!(revived.created, 9);
    }

    #[tokio::test]
    async fn test_insert_anchored_is_atomic() {
        let repo = CommentRepository::new(SqliteStore::in_memory().await.unwrap());
        let comment = Comment::new("atomic".into(), "bob".into(), 1);

        // Duplicate mention rows violate the unique pair index; the whole
        // compound write must roll back.
        let user = UserId::new();
        let duplicates = vec![Mention::new(comment.id, user, 1), Mention::new(comment.id, user, 1)];

        let err = repo.insert_anchored(&comment, &[], &duplicates).await.unwrap_err();
        assert!(matches!(err, TrackError::EntityAlreadyExists(_)));
        assert!(repo.find_by_id(&comment.id.to_string()).await.unwrap().is_none());
        assert!(repo.list_mentions(&comment.id.to_string()).await.unwrap().is_empty());

        // A clean compound write lands everything.
        let mentions = vec![Mention::new(comment.id, user, 2)];
        repo.insert_anchored(&comment, &[], &mentions).await.unwrap();
        assert!(repo.find_by_id(&comment.id.to_string()).await.unwrap().is_some());
        assert_eq!(repo.list_mentions(&comment.id.to_string()).await.unwrap().len(), 1);
    }
}
