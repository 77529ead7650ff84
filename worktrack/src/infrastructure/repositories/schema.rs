// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Database Schema
//!
//! DDL for every table in the row store. The layout is uniform:
//!
//! - every entity table carries `id TEXT PRIMARY KEY`, `created INTEGER`,
//!   `modified INTEGER`, and `deleted INTEGER DEFAULT 0`
//! - soft-delete-aware uniqueness uses partial unique indexes
//!   (`WHERE deleted = 0`) so removed rows free their natural keys
//! - the ten simple labeled tables and the fourteen mapping tables share a
//!   generated shape
//!
//! Statements are `CREATE … IF NOT EXISTS`, so applying the schema is
//! idempotent and runs at every startup.

use sqlx::SqlitePool;
use tracing::{debug, info};

use worktrack_domain::entities::{LabeledKind, MappingKind};

/// DDL for one simple labeled table.
///
/// The `level` column only carries meaning for priorities and the icon /
/// color pair only for decorated kinds; the uniform shape keeps the generic
/// repository to one code path.
fn labeled_table_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            icon TEXT,
            color TEXT,
            level INTEGER,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
    )
}

/// DDL for one mapping table plus its live-pair uniqueness index.
fn mapping_table_ddl(table: &str) -> Vec<String> {
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                left_id TEXT NOT NULL,
                right_id TEXT NOT NULL,
                created INTEGER NOT NULL,
                modified INTEGER NOT NULL,
                deleted INTEGER NOT NULL DEFAULT 0
            )"
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_pair
             ON {table}(left_id, right_id) WHERE deleted = 0"
        ),
        format!("CREATE INDEX IF NOT EXISTS idx_{table}_left ON {table}(left_id)"),
    ]
}

/// Every DDL statement in application order.
pub fn all_statements() -> Vec<String> {
    let mut statements: Vec<String> = vec![
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username) WHERE deleted = 0".to_string(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email) WHERE deleted = 0".to_string(),
        "CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            identifier TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            workflow_id TEXT,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_identifier ON projects(identifier) WHERE deleted = 0"
            .to_string(),
        "CREATE TABLE IF NOT EXISTS tickets (
            id TEXT PRIMARY KEY,
            ticket_number INTEGER NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            type_id TEXT,
            status_id TEXT,
            project_id TEXT NOT NULL,
            assignee TEXT,
            estimation INTEGER NOT NULL DEFAULT 0,
            story_points INTEGER NOT NULL DEFAULT 0,
            creator TEXT NOT NULL,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_number ON tickets(project_id, ticket_number)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_tickets_project ON tickets(project_id)".to_string(),
        "CREATE TABLE IF NOT EXISTS cycles (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            type INTEGER NOT NULL,
            cycle_id TEXT,
            started INTEGER,
            ended INTEGER,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            space_id TEXT NOT NULL,
            type_id TEXT,
            creator TEXT NOT NULL,
            version INTEGER NOT NULL DEFAULT 1,
            parent_id TEXT,
            project_id TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            published INTEGER NOT NULL DEFAULT 0,
            archived INTEGER NOT NULL DEFAULT 0,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE INDEX IF NOT EXISTS idx_documents_parent ON documents(parent_id)".to_string(),
        "CREATE TABLE IF NOT EXISTS document_contents (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            version INTEGER NOT NULL,
            content_type TEXT NOT NULL,
            content TEXT NOT NULL,
            created INTEGER NOT NULL
        )"
        .to_string(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_document_contents_version
         ON document_contents(document_id, version)"
            .to_string(),
        "CREATE TABLE IF NOT EXISTS document_versions (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            version INTEGER NOT NULL,
            created_by TEXT NOT NULL,
            created INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE TABLE IF NOT EXISTS attachments (
            id TEXT PRIMARY KEY,
            document_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            original_filename TEXT NOT NULL,
            mime TEXT NOT NULL,
            size INTEGER NOT NULL,
            storage_path TEXT NOT NULL,
            checksum TEXT NOT NULL,
            uploader TEXT NOT NULL,
            version INTEGER NOT NULL,
            description TEXT,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE INDEX IF NOT EXISTS idx_attachments_document ON attachments(document_id)".to_string(),
        "CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            author TEXT NOT NULL,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE TABLE IF NOT EXISTS mentions (
            id TEXT PRIMARY KEY,
            comment_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_mentions_pair
         ON mentions(comment_id, user_id) WHERE deleted = 0"
            .to_string(),
        "CREATE TABLE IF NOT EXISTS metadata (
            id TEXT PRIMARY KEY,
            entity_id TEXT NOT NULL,
            property TEXT NOT NULL,
            value TEXT NOT NULL,
            created INTEGER NOT NULL,
            modified INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )"
        .to_string(),
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_metadata_pair
         ON metadata(entity_id, property) WHERE deleted = 0"
            .to_string(),
    ];

    for kind in LabeledKind::ALL {
        statements.push(labeled_table_ddl(kind.table()));
    }
    for kind in MappingKind::ALL {
        statements.extend(mapping_table_ddl(kind.table()));
    }

    statements
}

/// Applies the full schema to the pool; idempotent.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("Ensuring database schema is up to date");

    for statement in all_statements() {
        sqlx::query(&statement).execute(pool).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}
