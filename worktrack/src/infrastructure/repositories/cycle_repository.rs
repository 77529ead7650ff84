// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cycle repository.
//!
//! Lists order `type DESC, created DESC`: releases before milestones before
//! sprints, newest first within each band. The hierarchy rule itself lives
//! in the domain entity; this layer only loads and stores.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::Cycle;
use worktrack_domain::value_objects::{CycleId, CycleKind};
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct CycleRepository {
    store: SqliteStore,
}

fn row_to_cycle(row: &SqliteRow) -> Result<Cycle, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;
    let kind_value: i64 = row.try_get("type").map_err(classify_db_error)?;
    let parent: Option<String> = row.try_get("cycle_id").map_err(classify_db_error)?;

    Ok(Cycle {
        id: CycleId::from_string(&id).map_err(|_| TrackError::database_error(format!("corrupt cycle id: {id}")))?,
        title: row.try_get("title").map_err(classify_db_error)?,
        description: row.try_get("description").map_err(classify_db_error)?,
        kind: CycleKind::from_value(kind_value)
            .map_err(|_| TrackError::database_error(format!("corrupt cycle type: {kind_value}")))?,
        cycle_id: parent
            .map(|p| CycleId::from_string(&p).map_err(|_| TrackError::database_error(format!("corrupt parent id: {p}"))))
            .transpose()?,
        started: row.try_get("started").map_err(classify_db_error)?,
        ended: row.try_get("ended").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl CycleRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub async fn insert(&self, cycle: &Cycle) -> Result<(), TrackError> {
        sqlx::query(
            "INSERT INTO cycles (id, title, description, type, cycle_id, started, ended, created, modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(cycle.id.to_string())
        .bind(&cycle.title)
        .bind(&cycle.description)
        .bind(cycle.kind.value())
        .bind(cycle.cycle_id.map(|p| p.to_string()))
        .bind(cycle.started)
        .bind(cycle.ended)
        .bind(cycle.created)
        .bind(cycle.modified)
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Cycle>, TrackError> {
        let row = sqlx::query("SELECT * FROM cycles WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_cycle).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Cycle>, TrackError> {
        let rows = sqlx::query("SELECT * FROM cycles WHERE deleted = 0 ORDER BY type DESC, created DESC")
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_cycle).collect()
    }

    pub async fn update(&self, cycle: &Cycle) -> Result<bool, TrackError> {
        let result = sqlx::query(
            "UPDATE cycles SET title = ?, description = ?, type = ?, cycle_id = ?, started = ?, ended = ?, modified = ?
             WHERE id = ? AND deleted = 0",
        )
        .bind(&cycle.title)
        .bind(&cycle.description)
        .bind(cycle.kind.value())
        .bind(cycle.cycle_id.map(|p| p.to_string()))
        .bind(cycle.started)
        .bind(cycle.ended)
        .bind(cycle.modified)
        .bind(cycle.id.to_string())
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: &str, now: i64) -> Result<bool, TrackError> {
        let result = sqlx::query("UPDATE cycles SET deleted = 1, modified = ? WHERE id = ? AND deleted = 0")
            .bind(now)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, TrackError> {
        let row = sqlx::query("SELECT 1 FROM cycles WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_orders_type_desc_then_created_desc() {
        let repo = CycleRepository::new(SqliteStore::in_memory().await.unwrap());

        repo.insert(&Cycle::new("old sprint".into(), CycleKind::Sprint, 10)).await.unwrap();
        repo.insert(&Cycle::new("release".into(), CycleKind::Release, 5)).await.unwrap();
        repo.insert(&Cycle::new("new sprint".into(), CycleKind::Sprint, 20)).await.unwrap();
        repo.insert(&Cycle::new("milestone".into(), CycleKind::Milestone, 1)).await.unwrap();

        let titles: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["release", "milestone", "new sprint", "old sprint"]);
    }

    #[tokio::test]
    async fn test_parent_round_trip() {
        let repo = CycleRepository::new(SqliteStore::in_memory().await.unwrap());

        let release = Cycle::new("release".into(), CycleKind::Release, 1);
        repo.insert(&release).await.unwrap();

        let mut sprint = Cycle::new("sprint".into(), CycleKind::Sprint, 2);
        sprint.cycle_id = Some(release.id);
        repo.insert(&sprint).await.unwrap();

        let loaded = repo.find_by_id(&sprint.id.to_string()).await.unwrap().unwrap();
        assert_eq!(loaded.cycle_id, Some(release.id));
        assert_eq!(loaded.kind, CycleKind::Sprint);
    }
}
