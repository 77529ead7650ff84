// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # User Entity
//!
//! User accounts with credential material. The password hash never crosses
//! the serialization boundary; handlers expose [`PublicUser`] projections
//! only.
//!
//! Registration rules: username non-empty and unique among non-deleted
//! users; email non-empty, basic shape, unique; password length >= 8; name
//! non-empty.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::UserId;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Role assigned at registration.
pub const DEFAULT_ROLE: &str = "user";

// Basic shape only: something @ something . something. Full RFC 5322
// validation is deliberately out of scope.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"));

/// A registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Adaptive salted hash (argon2); never serialized.
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created: i64,
    pub modified: i64,
    pub deleted: bool,
}

impl User {
    /// The public projection of this account.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            created: self.created,
        }
    }
}

/// The fields of a user that handlers may expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created: i64,
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Registration {
    /// Validates the registration fields.
    ///
    /// Uniqueness of username and email is checked against storage by the
    /// auth service, not here.
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.username.trim().is_empty() {
            return Err(TrackError::missing_data("username"));
        }
        if self.email.trim().is_empty() {
            return Err(TrackError::missing_data("email"));
        }
        if !EMAIL_SHAPE.is_match(&self.email) {
            return Err(TrackError::invalid_data(format!("email has invalid shape: {}", self.email)));
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(TrackError::invalid_data(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.name.trim().is_empty() {
            return Err(TrackError::missing_data("name"));
        }
        Ok(())
    }
}
