// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Labeled Entity Repository
//!
//! One repository for the whole simple labeled family. The ten backing
//! tables share a column layout, so every query is written once and the
//! [`LabeledKind`] descriptor supplies the table name. Table names come from
//! a closed enum, never from request input.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::{LabeledKind, LabeledOrder, LabeledRecord};
use worktrack_domain::value_objects::{LabeledId, PriorityLevel};
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

/// Repository over the ten simple labeled tables.
#[derive(Clone)]
pub struct LabeledRepository {
    store: SqliteStore,
}

fn row_to_record(row: &SqliteRow) -> Result<LabeledRecord, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;
    let level: Option<i64> = row.try_get("level").map_err(classify_db_error)?;

    Ok(LabeledRecord {
        id: LabeledId::from_string(&id).map_err(|_| TrackError::database_error(format!("corrupt id in row: {id}")))?,
        title: row.try_get("title").map_err(classify_db_error)?,
        description: row.try_get("description").map_err(classify_db_error)?,
        icon: row.try_get("icon").map_err(classify_db_error)?,
        color: row.try_get("color").map_err(classify_db_error)?,
        level: match level {
            Some(v) => Some(
                PriorityLevel::new(v).map_err(|_| TrackError::database_error(format!("corrupt level in row: {v}")))?,
            ),
            None => None,
        },
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl LabeledRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Inserts a new record.
    pub async fn insert(&self, kind: LabeledKind, record: &LabeledRecord) -> Result<(), TrackError> {
        let sql = format!(
            "INSERT INTO {} (id, title, description, icon, color, level, created, modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)",
            kind.table()
        );

        sqlx::query(&sql)
            .bind(record.id.to_string())
            .bind(&record.title)
            .bind(&record.description)
            .bind(&record.icon)
            .bind(&record.color)
            .bind(record.level.map(|l| l.value() as i64))
            .bind(record.created)
            .bind(record.modified)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(())
    }

    /// Loads a live record by id.
    pub async fn find_by_id(&self, kind: LabeledKind, id: &str) -> Result<Option<LabeledRecord>, TrackError> {
        let sql = format!("SELECT * FROM {} WHERE id = ? AND deleted = 0", kind.table());

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    /// Lists live records in the kind's declared order.
    pub async fn list(&self, kind: LabeledKind) -> Result<Vec<LabeledRecord>, TrackError> {
        let order = match kind.ordering() {
            LabeledOrder::TitleAsc => "title COLLATE NOCASE ASC",
            LabeledOrder::LevelAsc => "level ASC",
        };
        let sql = format!("SELECT * FROM {} WHERE deleted = 0 ORDER BY {}", kind.table(), order);

        let rows = sqlx::query(&sql)
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_record).collect()
    }

    /// Writes back every mutable field of a live record.
    ///
    /// Returns false when no live row matched (absent or deleted).
    pub async fn update(&self, kind: LabeledKind, record: &LabeledRecord) -> Result<bool, TrackError> {
        let sql = format!(
            "UPDATE {} SET title = ?, description = ?, icon = ?, color = ?, level = ?, modified = ?
             WHERE id = ? AND deleted = 0",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(&record.title)
            .bind(&record.description)
            .bind(&record.icon)
            .bind(&record.color)
            .bind(record.level.map(|l| l.value() as i64))
            .bind(record.modified)
            .bind(record.id.to_string())
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-deletes a live record; false when there was none.
    pub async fn soft_delete(&self, kind: LabeledKind, id: &str, now: i64) -> Result<bool, TrackError> {
        let sql = format!(
            "UPDATE {} SET deleted = 1, modified = ? WHERE id = ? AND deleted = 0",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(now)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    /// Test probe: loads a row regardless of the deleted flag.
    pub async fn find_any_by_id(&self, kind: LabeledKind, id: &str) -> Result<Option<LabeledRecord>, TrackError> {
        let sql = format!("SELECT * FROM {} WHERE id = ?", kind.table());

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_record).transpose()
    }
}
