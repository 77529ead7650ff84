// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Repository
//!
//! Documents plus their versioned content stream and history snapshots.
//!
//! `update_content` is the one multi-statement write in the system: content
//! insert, snapshot insert, and version bump run inside a single
//! transaction, and the bump carries an optimistic `WHERE version = ?`
//! guard. Zero affected rows means another writer won the race; the
//! transaction rolls back and the caller sees `VersionConflict`.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use ulid::Ulid;

use worktrack_domain::entities::{Document, DocumentContent, DocumentVersion};
use worktrack_domain::value_objects::{DocumentContentId, DocumentId, ProjectId};
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct DocumentRepository {
    store: SqliteStore,
}

fn row_to_document(row: &SqliteRow) -> Result<Document, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;
    let parent: Option<String> = row.try_get("parent_id").map_err(classify_db_error)?;
    let project: Option<String> = row.try_get("project_id").map_err(classify_db_error)?;

    Ok(Document {
        id: DocumentId::from_string(&id)
            .map_err(|_| TrackError::database_error(format!("corrupt document id: {id}")))?,
        title: row.try_get("title").map_err(classify_db_error)?,
        space_id: row.try_get("space_id").map_err(classify_db_error)?,
        type_id: row.try_get("type_id").map_err(classify_db_error)?,
        creator: row.try_get("creator").map_err(classify_db_error)?,
        version: row.try_get("version").map_err(classify_db_error)?,
        parent_id: parent
            .map(|p| {
                DocumentId::from_string(&p).map_err(|_| TrackError::database_error(format!("corrupt parent id: {p}")))
            })
            .transpose()?,
        project_id: project
            .map(|p| {
                ProjectId::from_string(&p).map_err(|_| TrackError::database_error(format!("corrupt project id: {p}")))
            })
            .transpose()?,
        position: row.try_get("position").map_err(classify_db_error)?,
        published: row.try_get::<i64, _>("published").map_err(classify_db_error)? != 0,
        archived: row.try_get::<i64, _>("archived").map_err(classify_db_error)? != 0,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

fn row_to_content(row: &SqliteRow) -> Result<DocumentContent, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;
    let document_id: String = row.try_get("document_id").map_err(classify_db_error)?;

    Ok(DocumentContent {
        id: DocumentContentId::from_string(&id)
            .map_err(|_| TrackError::database_error(format!("corrupt content id: {id}")))?,
        document_id: DocumentId::from_string(&document_id)
            .map_err(|_| TrackError::database_error(format!("corrupt document id: {document_id}")))?,
        version: row.try_get("version").map_err(classify_db_error)?,
        content_type: row.try_get("content_type").map_err(classify_db_error)?,
        content: row.try_get("content").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
    })
}

fn row_to_version(row: &SqliteRow) -> Result<DocumentVersion, TrackError> {
    let document_id: String = row.try_get("document_id").map_err(classify_db_error)?;

    Ok(DocumentVersion {
        id: row.try_get("id").map_err(classify_db_error)?,
        document_id: DocumentId::from_string(&document_id)
            .map_err(|_| TrackError::database_error(format!("corrupt document id: {document_id}")))?,
        version: row.try_get("version").map_err(classify_db_error)?,
        created_by: row.try_get("created_by").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
    })
}

impl DocumentRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Inserts a document with its version-1 content and snapshot rows.
    pub async fn insert(&self, document: &Document, initial_content: &DocumentContent) -> Result<(), TrackError> {
        let mut tx = self.store.pool().begin().await.map_err(classify_db_error)?;

        sqlx::query(
            "INSERT INTO documents (id, title, space_id, type_id, creator, version, parent_id, project_id,
                                    position, published, archived, created, modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(document.id.to_string())
        .bind(&document.title)
        .bind(&document.space_id)
        .bind(&document.type_id)
        .bind(&document.creator)
        .bind(document.version)
        .bind(document.parent_id.map(|p| p.to_string()))
        .bind(document.project_id.map(|p| p.to_string()))
        .bind(document.position)
        .bind(document.published as i64)
        .bind(document.archived as i64)
        .bind(document.created)
        .bind(document.modified)
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        sqlx::query(
            "INSERT INTO document_contents (id, document_id, version, content_type, content, created)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(initial_content.id.to_string())
        .bind(initial_content.document_id.to_string())
        .bind(initial_content.version)
        .bind(&initial_content.content_type)
        .bind(&initial_content.content)
        .bind(initial_content.created)
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        sqlx::query(
            "INSERT INTO document_versions (id, document_id, version, created_by, created)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Ulid::new().to_string())
        .bind(document.id.to_string())
        .bind(document.version)
        .bind(&document.creator)
        .bind(document.created)
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        tx.commit().await.map_err(classify_db_error)?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>, TrackError> {
        let row = sqlx::query("SELECT * FROM documents WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_document).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Document>, TrackError> {
        let rows = sqlx::query("SELECT * FROM documents WHERE deleted = 0 ORDER BY created DESC")
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_document).collect()
    }

    /// Lists live children of a document, `position ASC, created DESC`.
    pub async fn list_children(&self, parent_id: &str) -> Result<Vec<Document>, TrackError> {
        let rows = sqlx::query(
            "SELECT * FROM documents WHERE parent_id = ? AND deleted = 0 ORDER BY position ASC, created DESC",
        )
        .bind(parent_id)
        .fetch_all(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        rows.iter().map(row_to_document).collect()
    }

    /// Writes back mutable document fields (not the version; see
    /// [`DocumentRepository::update_content`]).
    pub async fn update(&self, document: &Document) -> Result<bool, TrackError> {
        let result = sqlx::query(
            "UPDATE documents SET title = ?, space_id = ?, type_id = ?, parent_id = ?, project_id = ?,
                                  position = ?, published = ?, archived = ?, modified = ?
             WHERE id = ? AND deleted = 0",
        )
        .bind(&document.title)
        .bind(&document.space_id)
        .bind(&document.type_id)
        .bind(document.parent_id.map(|p| p.to_string()))
        .bind(document.project_id.map(|p| p.to_string()))
        .bind(document.position)
        .bind(document.published as i64)
        .bind(document.archived as i64)
        .bind(document.modified)
        .bind(document.id.to_string())
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: &str, now: i64) -> Result<bool, TrackError> {
        let result = sqlx::query("UPDATE documents SET deleted = 1, modified = ? WHERE id = ? AND deleted = 0")
            .bind(now)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, TrackError> {
        let row = sqlx::query("SELECT 1 FROM documents WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;
        Ok(row.is_some())
    }

    /// Appends a content version: insert content + snapshot, bump version.
    ///
    /// The loaded version `expected` guards the bump; when another writer
    /// advanced the document in between, the transaction rolls back and the
    /// result is `VersionConflict`.
    pub async fn update_content(
        &self,
        document_id: &str,
        expected_version: i64,
        content: &DocumentContent,
        actor: &str,
        now: i64,
    ) -> Result<(), TrackError> {
        let mut tx = self.store.pool().begin().await.map_err(classify_db_error)?;

        // The guarded bump goes first: once it succeeds this transaction owns
        // the new version and the content insert cannot race the unique
        // (document, version) index.
        let bump = sqlx::query("UPDATE documents SET version = ?, modified = ? WHERE id = ? AND version = ? AND deleted = 0")
            .bind(content.version)
            .bind(now)
            .bind(document_id)
            .bind(expected_version)
            .execute(&mut *tx)
            .await
            .map_err(classify_db_error)?;

        if bump.rows_affected() == 0 {
            tx.rollback().await.map_err(classify_db_error)?;
            return Err(TrackError::version_conflict(format!(
                "document {} moved past version {}",
                document_id, expected_version
            )));
        }

        sqlx::query(
            "INSERT INTO document_contents (id, document_id, version, content_type, content, created)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(content.id.to_string())
        .bind(document_id)
        .bind(content.version)
        .bind(&content.content_type)
        .bind(&content.content)
        .bind(content.created)
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        sqlx::query(
            "INSERT INTO document_versions (id, document_id, version, created_by, created)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Ulid::new().to_string())
        .bind(document_id)
        .bind(content.version)
        .bind(actor)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        tx.commit().await.map_err(classify_db_error)?;
        Ok(())
    }

    /// Loads a content row; the latest when `version` is `None`.
    pub async fn find_content(
        &self,
        document_id: &str,
        version: Option<i64>,
    ) -> Result<Option<DocumentContent>, TrackError> {
        let row = match version {
            Some(v) => {
                sqlx::query("SELECT * FROM document_contents WHERE document_id = ? AND version = ?")
                    .bind(document_id)
                    .bind(v)
                    .fetch_optional(self.store.pool())
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM document_contents WHERE document_id = ? ORDER BY version DESC LIMIT 1")
                    .bind(document_id)
                    .fetch_optional(self.store.pool())
                    .await
            }
        }
        .map_err(classify_db_error)?;

        row.as_ref().map(row_to_content).transpose()
    }

    /// Loads one version snapshot by its id.
    pub async fn find_version_by_id(&self, id: &str) -> Result<Option<DocumentVersion>, TrackError> {
        let row = sqlx::query("SELECT * FROM document_versions WHERE id = ?")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_version).transpose()
    }

    /// Lists the version snapshots of a document, newest first.
    pub async fn list_versions(&self, document_id: &str) -> Result<Vec<DocumentVersion>, TrackError> {
        let rows = sqlx::query("SELECT * FROM document_versions WHERE document_id = ? ORDER BY version DESC")
            .bind(document_id)
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_version).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(now: i64) -> (Document, DocumentContent) {
        let doc = Document::new("Spec".into(), "space-1".into(), "alice".into(), now);
        let content = DocumentContent::new(doc.id, 1, "# v1".into(), None, now);
        (doc, content)
    }

    #[tokio::test]
    async fn test_insert_creates_version_one() {
        let repo = DocumentRepository::new(SqliteStore::in_memory().await.unwrap());
        let (doc, content) = fixture(100);
        repo.insert(&doc, &content).await.unwrap();

        let loaded = repo.find_by_id(&doc.id.to_string()).await.unwrap().unwrap();
        assert_eq!(loaded.version, 1);

        let latest = repo.find_content(&doc.id.to_string(), None).await.unwrap().unwrap();
        assert_eq!(latest.version, 1);
        assert_eq!(latest.content, "# v1");

        let versions = repo.list_versions(&doc.id.to_string()).await.unwrap();
        assert_eq!(versions.len(), 1);
    }

    #[tokio::test]
    async fn test_update_content_bumps_by_one() {
        let repo = DocumentRepository::new(SqliteStore::in_memory().await.unwrap());
        let (doc, content) = fixture(100);
        repo.insert(&doc, &content).await.unwrap();

        let next = DocumentContent::new(doc.id, 2, "# v2".into(), None, 200);
        repo.update_content(&doc.id.to_string(), 1, &next, "alice", 200).await.unwrap();

        let loaded = repo.find_by_id(&doc.id.to_string()).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        assert_eq!(loaded.modified, 200);

        let latest = repo.find_content(&doc.id.to_string(), None).await.unwrap().unwrap();
        assert_eq!(latest.version, 2);

        // The old version stays readable.
        let old = repo.find_content(&doc.id.to_string(), Some(1)).await.unwrap().unwrap();
        assert_eq!(old.content, "# v1");
    }

    #[tokio::test]
    async fn test_stale_version_conflicts_and_rolls_back() {
        let repo = DocumentRepository::new(SqliteStore::in_memory().await.unwrap());
        let (doc, content) = fixture(100);
        repo.insert(&doc, &content).await.unwrap();

        let next = DocumentContent::new(doc.id, 2, "# winner".into(), None, 200);
        repo.update_content(&doc.id.to_string(), 1, &next, "alice", 200).await.unwrap();

        // Loser saw version 1 and now loses the race.
        let stale = DocumentContent::new(doc.id, 2, "# loser".into(), None, 201);
        let err = repo
            .update_content(&doc.id.to_string(), 1, &stale, "bob", 201)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackError::VersionConflict(_)));

        // Document is still at the winner's version and the loser's rows
        // were rolled back.
        let loaded = repo.find_by_id(&doc.id.to_string()).await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        let latest = repo.find_content(&doc.id.to_string(), None).await.unwrap().unwrap();
        assert_eq!(latest.content, "# winner");
        assert_eq!(repo.list_versions(&doc.id.to_string()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_children_order_by_position() {
        let repo = DocumentRepository::new(SqliteStore::in_memory().await.unwrap());
        let (parent, parent_content) = fixture(100);
        repo.insert(&parent, &parent_content).await.unwrap();

        for (title, position, created) in [("b", 2, 10), ("a", 1, 20), ("c", 1, 30)] {
            let mut child = Document::new(title.into(), "space-1".into(), "alice".into(), created);
            child.parent_id = Some(parent.id);
            child.position = position;
            let content = DocumentContent::new(child.id, 1, "".into(), None, created);
            repo.insert(&child, &content).await.unwrap();
        }

        let titles: Vec<_> = repo
            .list_children(&parent.id.to_string())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }
}
