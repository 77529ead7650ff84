// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Password hashing.
//!
//! Argon2id with per-hash random salts. Verification failure and malformed
//! hash both report `false`; the auth service folds that into the single
//! indistinguishable `Unauthorized` outcome.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use worktrack_domain::TrackError;

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, TrackError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| TrackError::internal_error(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}
