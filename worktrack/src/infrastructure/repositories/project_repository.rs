// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Project repository.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::Project;
use worktrack_domain::value_objects::ProjectId;
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct ProjectRepository {
    store: SqliteStore,
}

fn row_to_project(row: &SqliteRow) -> Result<Project, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;

    Ok(Project {
        id: ProjectId::from_string(&id).map_err(|_| TrackError::database_error(format!("corrupt project id: {id}")))?,
        identifier: row.try_get("identifier").map_err(classify_db_error)?,
        title: row.try_get("title").map_err(classify_db_error)?,
        description: row.try_get("description").map_err(classify_db_error)?,
        workflow_id: row.try_get("workflow_id").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl ProjectRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Inserts a project; the identifier is a natural key among live rows.
    pub async fn insert(&self, project: &Project) -> Result<(), TrackError> {
        sqlx::query(
            "INSERT INTO projects (id, identifier, title, description, workflow_id, created, modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(project.id.to_string())
        .bind(&project.identifier)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.workflow_id)
        .bind(project.created)
        .bind(project.modified)
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Project>, TrackError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_project).transpose()
    }

    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Project>, TrackError> {
        let row = sqlx::query("SELECT * FROM projects WHERE identifier = ? AND deleted = 0")
            .bind(identifier)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_project).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Project>, TrackError> {
        let rows = sqlx::query("SELECT * FROM projects WHERE deleted = 0 ORDER BY created DESC")
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_project).collect()
    }

    pub async fn update(&self, project: &Project) -> Result<bool, TrackError> {
        let result = sqlx::query(
            "UPDATE projects SET identifier = ?, title = ?, description = ?, workflow_id = ?, modified = ?
             WHERE id = ? AND deleted = 0",
        )
        .bind(&project.identifier)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.workflow_id)
        .bind(project.modified)
        .bind(project.id.to_string())
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: &str, now: i64) -> Result<bool, TrackError> {
        let result = sqlx::query("UPDATE projects SET deleted = 1, modified = ? WHERE id = ? AND deleted = 0")
            .bind(now)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, TrackError> {
        let row = sqlx::query("SELECT 1 FROM projects WHERE id = ? AND deleted = 0")
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
    async fn test_identifier_is_unique_among_live_rows() {
        let repo = ProjectRepository::new(SqliteStore::in_memory().await.unwrap());

        let first = Project::new("WT".into(), "Worktrack".into(), 1);
        repo.insert(&first).await.unwrap();

        let duplicate = Project::new("WT".into(), "Other".into(), 2);
        let err = repo.insert(&duplicate).await.unwrap_err();
        assert!(matches!(err, TrackError::EntityAlreadyExists(_)));

        // Removing the first frees the identifier.
        repo.soft_delete(&first.id.to_string(), 3).await.unwrap();
        repo.insert(&duplicate).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_identifier() {
        let repo = ProjectRepository::new(SqliteStore::in_memory().await.unwrap());
        let project = Project::new("CORE".into(), "Core".into(), 1);
        repo.insert(&project).await.unwrap();

        let found = repo.find_by_identifier("CORE").await.unwrap().unwrap();
        assert_eq!(found.id, project.id);
        assert!(repo.find_by_identifier("MISSING").await.unwrap().is_none());
    }
}
