// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Ticket repository.
//!
//! The ticket number is assigned inside the insert transaction from the
//! current per-project maximum, so numbers stay unique within a project
//! even though the entity arrives with a placeholder.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::{Ticket, TicketFilter};
use worktrack_domain::value_objects::{ProjectId, TicketId};
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct TicketRepository {
    store: SqliteStore,
}

fn row_to_ticket(row: &SqliteRow) -> Result<Ticket, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;
    let project_id: String = row.try_get("project_id").map_err(classify_db_error)?;

    Ok(Ticket {
        id: TicketId::from_string(&id).map_err(|_| TrackError::database_error(format!("corrupt ticket id: {id}")))?,
        ticket_number: row.try_get("ticket_number").map_err(classify_db_error)?,
        title: row.try_get("title").map_err(classify_db_error)?,
        description: row.try_get("description").map_err(classify_db_error)?,
        position: row.try_get("position").map_err(classify_db_error)?,
        type_id: row.try_get("type_id").map_err(classify_db_error)?,
        status_id: row.try_get("status_id").map_err(classify_db_error)?,
        project_id: ProjectId::from_string(&project_id)
            .map_err(|_| TrackError::database_error(format!("corrupt project id: {project_id}")))?,
        assignee: row.try_get("assignee").map_err(classify_db_error)?,
        estimation: row.try_get("estimation").map_err(classify_db_error)?,
        story_points: row.try_get("story_points").map_err(classify_db_error)?,
        creator: row.try_get("creator").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl TicketRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Inserts the ticket, assigning the next per-project ticket number.
    ///
    /// Returns the assigned number. Number selection and insert run in one
    /// transaction; the unique (project, number) index backstops races.
    pub async fn insert(&self, ticket: &Ticket) -> Result<i64, TrackError> {
        let mut tx = self.store.pool().begin().await.map_err(classify_db_error)?;

        let next_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(ticket_number), 0) + 1 FROM tickets WHERE project_id = ?")
                .bind(ticket.project_id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(classify_db_error)?;

        sqlx::query(
            "INSERT INTO tickets (id, ticket_number, title, description, position, type_id, status_id,
                                  project_id, assignee, estimation, story_points, creator, created, modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(ticket.id.to_string())
        .bind(next_number)
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.position)
        .bind(&ticket.type_id)
        .bind(&ticket.status_id)
        .bind(ticket.project_id.to_string())
        .bind(&ticket.assignee)
        .bind(ticket.estimation)
        .bind(ticket.story_points)
        .bind(&ticket.creator)
        .bind(ticket.created)
        .bind(ticket.modified)
        .execute(&mut *tx)
        .await
        .map_err(classify_db_error)?;

        tx.commit().await.map_err(classify_db_error)?;
        Ok(next_number)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Ticket>, TrackError> {
        let row = sqlx::query("SELECT * FROM tickets WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_ticket).transpose()
    }

    /// Lists live tickets, newest first, honoring the optional filters.
    pub async fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TrackError> {
        let mut sql = String::from("SELECT * FROM tickets WHERE deleted = 0");
        if filter.project_id.is_some() {
            sql.push_str(" AND project_id = ?");
        }
        if filter.status_id.is_some() {
            sql.push_str(" AND status_id = ?");
        }
        if filter.assignee.is_some() {
            sql.push_str(" AND assignee = ?");
        }
        sql.push_str(" ORDER BY created DESC");

        let mut query = sqlx::query(&sql);
        if let Some(project_id) = &filter.project_id {
            query = query.bind(project_id.to_string());
        }
        if let Some(status_id) = &filter.status_id {
            query = query.bind(status_id);
        }
        if let Some(assignee) = &filter.assignee {
            query = query.bind(assignee);
        }

        let rows = query.fetch_all(self.store.pool()).await.map_err(classify_db_error)?;
        rows.iter().map(row_to_ticket).collect()
    }

    pub async fn update(&self, ticket: &Ticket) -> Result<bool, TrackError> {
        let result = sqlx::query(
            "UPDATE tickets SET title = ?, description = ?, position = ?, type_id = ?, status_id = ?,
                                assignee = ?, estimation = ?, story_points = ?, modified = ?
             WHERE id = ? AND deleted = 0",
        )
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.position)
        .bind(&ticket.type_id)
        .bind(&ticket.status_id)
        .bind(&ticket.assignee)
        .bind(ticket.estimation)
        .bind(ticket.story_points)
        .bind(ticket.modified)
        .bind(ticket.id.to_string())
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: &str, now: i64) -> Result<bool, TrackError> {
        let result = sqlx::query("UPDATE tickets SET deleted = 1, modified = ? WHERE id = ? AND deleted = 0")
            .bind(now)
            .bind(id)
            .execute(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(&self, id: &str) -> Result<bool, TrackError> {
        let row = sqlx::query("SELECT 1 FROM tickets WHERE id = ? AND deleted = 0")
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

    async fn repo() -> TicketRepository {
        TicketRepository::new(SqliteStore::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_ticket_numbers_increment_per_project() {
        let repo = repo().await;
        let project_a = ProjectId::new();
        let project_b = ProjectId::new();

        let t1 = Ticket::new("one".into(), project_a, "alice".into(), 1);
        let t2 = Ticket::new("two".into(), project_a, "alice".into(), 2);
        let t3 = Ticket::new("other".into(), project_b, "alice".into(), 3);

        assert_eq!(repo.insert(&t1).await.unwrap(), 1);
        assert_eq!(repo.insert(&t2).await.unwrap(), 2);
        assert_eq!(repo.insert(&t3).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_assignee() {
        let repo = repo().await;
        let project = ProjectId::new();

        let mut mine = Ticket::new("mine".into(), project, "alice".into(), 1);
        mine.assignee = Some("alice".into());
        let theirs = Ticket::new("theirs".into(), project, "bob".into(), 2);

        repo.insert(&mine).await.unwrap();
        repo.insert(&theirs).await.unwrap();

        let filter = TicketFilter {
            assignee: Some("alice".into()),
            ..TicketFilter::default()
        };
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "mine");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = repo().await;
        let project = ProjectId::new();
        repo.insert(&Ticket::new("old".into(), project, "a".into(), 10)).await.unwrap();
        repo.insert(&Ticket::new("new".into(), project, "a".into(), 20)).await.unwrap();

        let all = repo.list(&TicketFilter::default()).await.unwrap();
        assert_eq!(all[0].title, "new");
        assert_eq!(all[1].title, "old");
    }
}
