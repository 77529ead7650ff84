// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the closed error taxonomy for the worktrack domain.
//! Every fallible operation in the system classifies its failure into exactly
//! one of these kinds, and the dispatcher maps each kind to a wire error code
//! and an HTTP status.
//!
//! ## Overview
//!
//! The error system is designed around a small set of principles:
//!
//! - **Closed Set**: The taxonomy grows only by code change; handlers never
//!   invent ad-hoc failure modes
//! - **Classified**: Each variant carries a wire error code and an HTTP
//!   status, so translation at the boundary is mechanical
//! - **Opaque to Clients**: Raw storage or library errors are never forwarded;
//!   they are classified into `DatabaseError` / `InternalError` with a short
//!   human message
//! - **Actionable**: Validation variants (`MissingData`, `InvalidData`) carry
//!   the offending field or rule in the message
//!
//! ## Error Categories
//!
//! ### Request Errors (HTTP 400)
//! - **InvalidRequest**: Malformed envelope or unknown action tag
//! - **MissingData**: A required field is absent or empty
//! - **InvalidData**: A field violates a domain rule (range, enum, hierarchy)
//!
//! ### Identity Errors (HTTP 401/403)
//! - **Unauthorized**: Missing or invalid credential; also covers login
//!   failures so absent-user and wrong-password stay indistinguishable
//! - **Forbidden**: The permission port denied the action
//!
//! ### Entity Errors (HTTP 404/409)
//! - **EntityNotFound**: Target or one of its dependencies is absent or
//!   soft-deleted
//! - **EntityAlreadyExists**: A natural-key or mapping uniqueness violation
//! - **VersionConflict**: Optimistic concurrency check failed
//!
//! ### Infrastructure Errors (HTTP 500)
//! - **PermissionServiceError**: The permission port itself failed
//! - **DatabaseError**: Storage operation failure
//! - **InternalError**: Anything else

use thiserror::Error;

/// Domain-specific errors for the work-tracking system.
///
/// Each variant includes a descriptive message. The variant, not the message,
/// is the contract: handlers and tests match on the variant, while the message
/// is forwarded to clients as `errorMessage`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Entity already exists: {0}")]
    EntityAlreadyExists(String),

    #[error("Version conflict: {0}")]
    VersionConflict(String),

    #[error("Permission service error: {0}")]
    PermissionServiceError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl TrackError {
    /// Creates a new invalid-request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates a new missing-data error naming the field
    pub fn missing_data(field: impl Into<String>) -> Self {
        Self::MissingData(field.into())
    }

    /// Creates a new invalid-data error
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Creates a new unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Creates a new forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Creates a new entity-not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::EntityNotFound(msg.into())
    }

    /// Creates a new entity-already-exists error
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::EntityAlreadyExists(msg.into())
    }

    /// Creates a new version-conflict error
    pub fn version_conflict(msg: impl Into<String>) -> Self {
        Self::VersionConflict(msg.into())
    }

    /// Creates a new database error
    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// The wire error code carried in the response envelope.
    ///
    /// The values are part of the external contract and are fixed; see the
    /// taxonomy table in the crate documentation.
    pub fn error_code(&self) -> i32 {
        match self {
            TrackError::InvalidRequest(_) => 1001,
            TrackError::MissingData(_) => 1002,
            TrackError::InvalidData(_) => 1003,
            TrackError::Unauthorized(_) => 2001,
            TrackError::Forbidden(_) => 2003,
            TrackError::EntityNotFound(_) => 3001,
            TrackError::EntityAlreadyExists(_) => 3002,
            TrackError::VersionConflict(_) => 3003,
            TrackError::PermissionServiceError(_) => 5001,
            TrackError::DatabaseError(_) => 5002,
            TrackError::InternalError(_) => 5999,
        }
    }

    /// The HTTP status the dispatcher assigns to this error class.
    pub fn http_status(&self) -> u16 {
        match self {
            TrackError::InvalidRequest(_) | TrackError::MissingData(_) | TrackError::InvalidData(_) => 400,
            TrackError::Unauthorized(_) => 401,
            TrackError::Forbidden(_) => 403,
            TrackError::EntityNotFound(_) => 404,
            TrackError::EntityAlreadyExists(_) | TrackError::VersionConflict(_) => 409,
            TrackError::PermissionServiceError(_) | TrackError::DatabaseError(_) | TrackError::InternalError(_) => 500,
        }
    }

    /// Gets the error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            TrackError::InvalidRequest(_) => "request",
            TrackError::MissingData(_) => "validation",
            TrackError::InvalidData(_) => "validation",
            TrackError::Unauthorized(_) => "identity",
            TrackError::Forbidden(_) => "identity",
            TrackError::EntityNotFound(_) => "entity",
            TrackError::EntityAlreadyExists(_) => "entity",
            TrackError::VersionConflict(_) => "concurrency",
            TrackError::PermissionServiceError(_) => "permission",
            TrackError::DatabaseError(_) => "database",
            TrackError::InternalError(_) => "internal",
        }
    }

    /// Checks if the error is caused by client input rather than the system
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::InvalidRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(TrackError::invalid_request("x").error_code(), 1001);
        assert_eq!(TrackError::missing_data("title").error_code(), 1002);
        assert_eq!(TrackError::invalid_data("x").error_code(), 1003);
        assert_eq!(TrackError::unauthorized("x").error_code(), 2001);
        assert_eq!(TrackError::forbidden("x").error_code(), 2003);
        assert_eq!(TrackError::not_found("x").error_code(), 3001);
        assert_eq!(TrackError::already_exists("x").error_code(), 3002);
        assert_eq!(TrackError::version_conflict("x").error_code(), 3003);
        assert_eq!(TrackError::database_error("x").error_code(), 5002);
        assert_eq!(TrackError::internal_error("x").error_code(), 5999);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(TrackError::missing_data("title").http_status(), 400);
        assert_eq!(TrackError::unauthorized("x").http_status(), 401);
        assert_eq!(TrackError::forbidden("x").http_status(), 403);
        assert_eq!(TrackError::not_found("x").http_status(), 404);
        assert_eq!(TrackError::already_exists("x").http_status(), 409);
        assert_eq!(TrackError::version_conflict("x").http_status(), 409);
        assert_eq!(TrackError::database_error("x").http_status(), 500);
    }

    #[test]
    fn test_client_error_classification() {
        assert!(TrackError::invalid_data("level out of range").is_client_error());
        assert!(!TrackError::database_error("io").is_client_error());
    }
}
