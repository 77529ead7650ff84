// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # SQLite Store
//!
//! The storage boundary every repository builds on: a pooled SQLite
//! connection with parameterized exec, row fetch, and scan, plus
//! transactional wrappers for multi-statement atomic work.
//!
//! Raw `sqlx` errors never leave this layer; they are classified into the
//! domain taxonomy (`DatabaseError`, with unique-constraint violations
//! mapped to `EntityAlreadyExists`).

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::debug;

use worktrack_domain::TrackError;

use super::schema;

/// Classifies a sqlx error into the domain taxonomy.
///
/// Unique-index violations surface as `EntityAlreadyExists` so races on a
/// natural key lose cleanly instead of reporting a server fault.
pub fn classify_db_error(err: sqlx::Error) -> TrackError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return TrackError::already_exists("a row with the same natural key already exists");
        }
    }
    TrackError::database_error(err.to_string())
}

/// Pooled SQLite store shared by every repository.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) a database file and applies the schema.
    pub async fn open(database_path: &str, max_connections: u32) -> Result<Self, TrackError> {
        debug!(path = database_path, "opening sqlite store");

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", database_path))
            .map_err(|e| TrackError::database_error(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(classify_db_error)?;

        schema::ensure_schema(&pool).await.map_err(classify_db_error)?;
        Ok(Self { pool })
    }

    /// Creates an in-memory store with the schema applied (tests).
    ///
    /// A single connection keeps every statement on the same in-memory
    /// database.
    pub async fn in_memory() -> Result<Self, TrackError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .map_err(classify_db_error)?;

        schema::ensure_schema(&pool).await.map_err(classify_db_error)?;
        Ok(Self { pool })
    }

    /// The underlying pool, for repositories and test probes.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
