// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Bearer token signing and verification.
//!
//! HS256 JWTs binding (user id, username, role, expiry). Every verification
//! failure — bad signature, expiry, malformed token — collapses into
//! `Unauthorized` so callers cannot probe which check failed.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use worktrack_domain::TrackError;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issues a token expiring `ttl_secs` after `now`.
    pub fn issue(&self, user_id: &str, username: &str, role: &str, now: i64) -> Result<String, TrackError> {
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TrackError::internal_error(format!("token signing failed: {}", e)))
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TrackError> {
        let validation = Validation::default();
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TrackError::unauthorized("invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use worktrack_domain::services::{Clock, SystemClock};

    fn service() -> TokenService {
        TokenService::new("test-secret-at-least-32-bytes-long!!", 3600)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let svc = service();
        let now = SystemClock.now_unix();
        let token = svc.issue("u-1", "alice", "user", now).unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let now = SystemClock.now_unix();
        let token = service().issue("u-1", "alice", "user", now).unwrap();

        let other = TokenService::new("a-completely-different-signing-key!!", 3600);
        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, TrackError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let svc = TokenService::new("test-secret-at-least-32-bytes-long!!", 120);
        // Issued far in the past so exp is well beyond any leeway.
        let token = svc.issue("u-1", "alice", "user", 1_000_000).unwrap();
        assert!(matches!(svc.verify(&token), Err(TrackError::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        assert!(matches!(service().verify("garbage"), Err(TrackError::Unauthorized(_))));
    }
}
