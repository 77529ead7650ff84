// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Mapping Repository
//!
//! One repository for all fourteen mapping tables, driven by the
//! [`MappingKind`] descriptor. Semantics per the mapping contract:
//!
//! - `attach` requires both endpoints live, rejects a live duplicate with
//!   `EntityAlreadyExists`, and restores a soft-deleted pair with fresh
//!   timestamps
//! - `detach` soft-deletes the live pair or reports `EntityNotFound`
//! - listings join through live mappings only and order by mapping
//!   `created DESC`

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::{EndpointFamily, MappingKind, MappingRecord};
use worktrack_domain::value_objects::MappingId;
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct MappingRepository {
    store: SqliteStore,
}

fn row_to_mapping(row: &SqliteRow) -> Result<MappingRecord, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;

    Ok(MappingRecord {
        id: MappingId::from_string(&id).map_err(|_| TrackError::database_error(format!("corrupt mapping id: {id}")))?,
        left_id: row.try_get("left_id").map_err(classify_db_error)?,
        right_id: row.try_get("right_id").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl MappingRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Checks one endpoint is live; `EntityNotFound` names the missing side.
    async fn require_endpoint(&self, family: EndpointFamily, id: &str) -> Result<(), TrackError> {
        let Some(table) = family.table() else {
            // Generic entity links carry ids the store cannot resolve to one
            // table; only the id shape is checked.
            if id.trim().is_empty() {
                return Err(TrackError::missing_data("entityId"));
            }
            return Ok(());
        };

        let sql = format!("SELECT 1 FROM {table} WHERE id = ? AND deleted = 0");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        if row.is_none() {
            return Err(TrackError::not_found(format!("{} {} does not exist", family.name(), id)));
        }
        Ok(())
    }

    /// Attaches `left` to `right`, returning the live mapping row.
    pub async fn attach(
        &self,
        kind: MappingKind,
        left_id: &str,
        right_id: &str,
        now: i64,
    ) -> Result<MappingRecord, TrackError> {
        self.require_endpoint(kind.left(), left_id).await?;
        self.require_endpoint(kind.right(), right_id).await?;

        let table = kind.table();
        let existing_sql = format!("SELECT * FROM {table} WHERE left_id = ? AND right_id = ?");
        let existing = sqlx::query(&existing_sql)
            .bind(left_id)
            .bind(right_id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        if let Some(row) = existing {
            let record = row_to_mapping(&row)?;
            if !record.deleted {
                return Err(TrackError::already_exists(format!(
                    "{} mapping between {} and {} already exists",
                    kind.object_type(),
                    left_id,
                    right_id
                )));
            }

            // Restore the soft-deleted pair with fresh timestamps.
            let restore_sql = format!("UPDATE {table} SET deleted = 0, created = ?, modified = ? WHERE id = ?");
            sqlx::query(&restore_sql)
                .bind(now)
                .bind(now)
                .bind(record.id.to_string())
                .execute(self.store.pool())
                .await
                .map_err(classify_db_error)?;

            return Ok(MappingRecord {
                created: now,
                modified: now,
                deleted: false,
                ..record
            });
        }

        let record = MappingRecord::new(left_id.to_string(), right_id.to_string(), now);
        let insert_sql =
            format!("INSERT INTO {table} (id, left_id, right_id, created, modified, deleted) VALUES (?, ?, ?, ?, ?, 0)");
        sqlx::query(&insert_sql)
            .bind(record.id.to_string())
            .bind(&record.left_id)
            .bind(&record.right_id)
            .bind(record.created)
            .bind(record.modified)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(record)
    }

    /// Soft-deletes the live pair; `EntityNotFound` when there is none.
    pub async fn detach(&self, kind: MappingKind, left_id: &str, right_id: &str, now: i64) -> Result<(), TrackError> {
        let sql = format!(
            "UPDATE {} SET deleted = 1, modified = ? WHERE left_id = ? AND right_id = ? AND deleted = 0",
            kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(now)
            .bind(left_id)
            .bind(right_id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        if result.rows_affected() == 0 {
            return Err(TrackError::not_found(format!(
                "no live {} mapping between {} and {}",
                kind.object_type(),
                left_id,
                right_id
            )));
        }
        Ok(())
    }

    /// Right-side ids joined through live mappings, mapping `created DESC`.
    ///
    /// The right endpoint rows are filtered live too, when the family has a
    /// table to check against.
    pub async fn list_right_ids(&self, kind: MappingKind, left_id: &str) -> Result<Vec<String>, TrackError> {
        let sql = match kind.right().table() {
            Some(right_table) => format!(
                "SELECT m.right_id AS right_id FROM {} m
                 INNER JOIN {right_table} r ON r.id = m.right_id
                 WHERE m.left_id = ? AND m.deleted = 0 AND r.deleted = 0
                 ORDER BY m.created DESC",
                kind.table()
            ),
            None => format!(
                "SELECT right_id FROM {} WHERE left_id = ? AND deleted = 0 ORDER BY created DESC",
                kind.table()
            ),
        };

        let rows = sqlx::query(&sql)
            .bind(left_id)
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("right_id").map_err(classify_db_error))
            .collect()
    }

    /// Left-side ids joined through live mappings, mapping `created DESC`.
    pub async fn list_left_ids(&self, kind: MappingKind, right_id: &str) -> Result<Vec<String>, TrackError> {
        let sql = match kind.left().table() {
            Some(left_table) => format!(
                "SELECT m.left_id AS left_id FROM {} m
                 INNER JOIN {left_table} l ON l.id = m.left_id
                 WHERE m.right_id = ? AND m.deleted = 0 AND l.deleted = 0
                 ORDER BY m.created DESC",
                kind.table()
            ),
            None => format!(
                "SELECT left_id FROM {} WHERE right_id = ? AND deleted = 0 ORDER BY created DESC",
                kind.table()
            ),
        };

        let rows = sqlx::query(&sql)
            .bind(right_id)
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("left_id").map_err(classify_db_error))
            .collect()
    }

    /// Test probe: the raw pair row regardless of the deleted flag.
    pub async fn find_pair_any(
        &self,
        kind: MappingKind,
        left_id: &str,
        right_id: &str,
    ) -> Result<Option<MappingRecord>, TrackError> {
        let sql = format!("SELECT * FROM {} WHERE left_id = ? AND right_id = ?", kind.table());
        let row = sqlx::query(&sql)
            .bind(left_id)
            .bind(right_id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }
}
