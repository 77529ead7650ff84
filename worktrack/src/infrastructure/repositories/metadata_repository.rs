// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Metadata repository.
//!
//! One live row per (entity, property). `set` overwrites in place when the
//! property already exists (or revives a soft-deleted row), so callers see
//! upsert semantics.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::MetadataRecord;
use worktrack_domain::value_objects::MetadataId;
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct MetadataRepository {
    store: SqliteStore,
}

fn row_to_record(row: &SqliteRow) -> Result<MetadataRecord, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;

    Ok(MetadataRecord {
        id: MetadataId::from_string(&id)
            .map_err(|_| TrackError::database_error(format!("corrupt metadata id: {id}")))?,
        entity_id: row.try_get("entity_id").map_err(classify_db_error)?,
        property: row.try_get("property").map_err(classify_db_error)?,
        value: row.try_get("value").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl MetadataRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Upserts a property value; returns the row and whether it was new.
    pub async fn set(
        &self,
        entity_id: &str,
        property: &str,
        value: &str,
        now: i64,
    ) -> Result<(MetadataRecord, bool), TrackError> {
        let existing = sqlx::query("SELECT * FROM metadata WHERE entity_id = ? AND property = ?")
            .bind(entity_id)
            .bind(property)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        if let Some(row) = existing {
            let mut record = row_to_record(&row)?;
            let was_deleted = record.deleted;
            record.value = value.to_string();
            record.modified = now;
            record.deleted = false;
            if was_deleted {
                record.created = now;
            }

            sqlx::query("UPDATE metadata SET value = ?, created = ?, modified = ?, deleted = 0 WHERE id = ?")
                .bind(&record.value)
                .bind(record.created)
                .bind(record.modified)
                .bind(record.id.to_string())
                .execute(self.store.pool())
                .await
                .map_err(classify_db_error)?;

            return Ok((record, was_deleted));
        }

        let record = MetadataRecord::new(entity_id.to_string(), property.to_string(), value.to_string(), now);
        sqlx::query(
            "INSERT INTO metadata (id, entity_id, property, value, created, modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(record.id.to_string())
        .bind(&record.entity_id)
        .bind(&record.property)
        .bind(&record.value)
        .bind(record.created)
        .bind(record.modified)
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok((record, true))
    }

    pub async fn get(&self, entity_id: &str, property: &str) -> Result<Option<MetadataRecord>, TrackError> {
        let row = sqlx::query("SELECT * FROM metadata WHERE entity_id = ? AND property = ? AND deleted = 0")
            .bind(entity_id)
            .bind(property)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_record).transpose()
    }

    pub async fn list(&self, entity_id: &str) -> Result<Vec<MetadataRecord>, TrackError> {
        let rows = sqlx::query("SELECT * FROM metadata WHERE entity_id = ? AND deleted = 0 ORDER BY property ASC")
            .bind(entity_id)
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_record).collect()
    }

    pub async fn remove(&self, entity_id: &str, property: &str, now: i64) -> Result<bool, TrackError> {
        let result =
            sqlx::query("UPDATE metadata SET deleted = 1, modified = ? WHERE entity_id = ? AND property = ? AND deleted = 0")
                .bind(now)
                .bind(entity_id)
                .bind(property)
                .execute(self.store.pool())
                .await
                .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
