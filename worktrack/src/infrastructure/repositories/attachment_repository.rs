// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Attachment repository.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::Attachment;
use worktrack_domain::value_objects::{AttachmentId, DocumentId};
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct AttachmentRepository {
    store: SqliteStore,
}

fn row_to_attachment(row: &SqliteRow) -> Result<Attachment, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;
    let document_id: String = row.try_get("document_id").map_err(classify_db_error)?;

    Ok(Attachment {
        id: AttachmentId::from_string(&id)
            .map_err(|_| TrackError::database_error(format!("corrupt attachment id: {id}")))?,
        document_id: DocumentId::from_string(&document_id)
            .map_err(|_| TrackError::database_error(format!("corrupt document id: {document_id}")))?,
        filename: row.try_get("filename").map_err(classify_db_error)?,
        original_filename: row.try_get("original_filename").map_err(classify_db_error)?,
        mime: row.try_get("mime").map_err(classify_db_error)?,
        size: row.try_get("size").map_err(classify_db_error)?,
        storage_path: row.try_get("storage_path").map_err(classify_db_error)?,
        checksum: row.try_get("checksum").map_err(classify_db_error)?,
        uploader: row.try_get("uploader").map_err(classify_db_error)?,
        version: row.try_get("version").map_err(classify_db_error)?,
        description: row.try_get("description").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl AttachmentRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub async fn insert(&self, attachment: &Attachment) -> Result<(), TrackError> {
        sqlx::query(
            "INSERT INTO attachments (id, document_id, filename, original_filename, mime, size, storage_path,
                                      checksum, uploader, version, description, created, modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(attachment.id.to_string())
        .bind(attachment.document_id.to_string())
        .bind(&attachment.filename)
        .bind(&attachment.original_filename)
        .bind(&attachment.mime)
        .bind(attachment.size)
        .bind(&attachment.storage_path)
        .bind(&attachment.checksum)
        .bind(&attachment.uploader)
        .bind(attachment.version)
        .bind(&attachment.description)
        .bind(attachment.created)
        .bind(attachment.modified)
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Attachment>, TrackError> {
        let row = sqlx::query("SELECT * FROM attachments WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_attachment).transpose()
    }

    pub async fn list_by_document(&self, document_id: &str) -> Result<Vec<Attachment>, TrackError> {
        let rows = sqlx::query("SELECT * FROM attachments WHERE document_id = ? AND deleted = 0 ORDER BY created DESC")
            .bind(document_id)
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_attachment).collect()
    }

    pub async fn update(&self, attachment: &Attachment) -> Result<bool, TrackError> {
        let result = sqlx::query(
            "UPDATE attachments SET filename = ?, description = ?, modified = ? WHERE id = ? AND deleted = 0",
        )
        .bind(&attachment.filename)
        .bind(&attachment.description)
        .bind(attachment.modified)
        .bind(attachment.id.to_string())
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: &str, now: i64) -> Result<bool, TrackError> {
        let result = sqlx::query("UPDATE attachments SET deleted = 1, modified = ? WHERE id = ? AND deleted = 0")
            .bind(now)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
