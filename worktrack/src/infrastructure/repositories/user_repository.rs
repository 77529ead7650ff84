// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! User repository.
//!
//! Username and email are natural keys among live rows (partial unique
//! indexes); a race past the pre-check surfaces as `EntityAlreadyExists`
//! through the store's error classification.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use worktrack_domain::entities::User;
use worktrack_domain::value_objects::UserId;
use worktrack_domain::TrackError;

use super::store::{classify_db_error, SqliteStore};

#[derive(Clone)]
pub struct UserRepository {
    store: SqliteStore,
}

fn row_to_user(row: &SqliteRow) -> Result<User, TrackError> {
    let id: String = row.try_get("id").map_err(classify_db_error)?;

    Ok(User {
        id: UserId::from_string(&id).map_err(|_| TrackError::database_error(format!("corrupt user id: {id}")))?,
        username: row.try_get("username").map_err(classify_db_error)?,
        email: row.try_get("email").map_err(classify_db_error)?,
        password_hash: row.try_get("password_hash").map_err(classify_db_error)?,
        name: row.try_get("name").map_err(classify_db_error)?,
        role: row.try_get("role").map_err(classify_db_error)?,
        created: row.try_get("created").map_err(classify_db_error)?,
        modified: row.try_get("modified").map_err(classify_db_error)?,
        deleted: row.try_get::<i64, _>("deleted").map_err(classify_db_error)? != 0,
    })
}

impl UserRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub async fn insert(&self, user: &User) -> Result<(), TrackError> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, name, role, created, modified, deleted)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.role)
        .bind(user.created)
        .bind(user.modified)
        .execute(self.store.pool())
        .await
        .map_err(classify_db_error)?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, TrackError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, TrackError> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ? AND deleted = 0")
            .bind(username)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, TrackError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ? AND deleted = 0")
            .bind(email)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn list(&self) -> Result<Vec<User>, TrackError> {
        let rows = sqlx::query("SELECT * FROM users WHERE deleted = 0 ORDER BY username COLLATE NOCASE ASC")
            .fetch_all(self.store.pool())
            .await
            .map_err(classify_db_error)?;

        rows.iter().map(row_to_user).collect()
    }

    pub async fn exists(&self, id: &str) -> Result<bool, TrackError> {
        let row = sqlx::query("SELECT 1 FROM users WHERE id = ? AND deleted = 0")
            .bind(id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(classify_db_error)?;
        Ok(row.is_some())
    }
}
