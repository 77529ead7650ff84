// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Role-Based Permission Service
//!
//! The in-process implementation of the permission port. Policy is
//! deliberately coarse: admins may do anything, users may do anything except
//! actions listed as admin-only in the configuration. Deployments with an
//! external authorization system implement [`PermissionService`] against it
//! and swap the wiring in `main`.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use worktrack_domain::services::{Decision, PermissionService};
use worktrack_domain::TrackError;

use crate::infrastructure::repositories::UserRepository;

/// Role looked up from storage per check; admin bypasses restrictions.
pub struct RolePermissionService {
    users: UserRepository,
    /// `object:action` pairs that require the admin role.
    admin_only: RwLock<HashSet<String>>,
}

impl RolePermissionService {
    pub fn new(users: UserRepository) -> Self {
        Self {
            users,
            admin_only: RwLock::new(HashSet::new()),
        }
    }

    /// Marks an `object:action` pair as admin-only.
    pub fn restrict(&self, object: &str, action: &str) {
        self.admin_only.write().insert(format!("{}:{}", object, action));
    }

    fn is_restricted(&self, object: &str, action: &str) -> bool {
        self.admin_only.read().contains(&format!("{}:{}", object, action))
    }
}

#[async_trait]
impl PermissionService for RolePermissionService {
    async fn check(&self, username: &str, object: &str, action: &str) -> Result<Decision, TrackError> {
        let user = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| TrackError::PermissionServiceError(format!("user lookup failed: {}", e)))?;

        let Some(user) = user else {
            // A token may outlive its account; a missing user is a denial,
            // not a port failure.
            return Ok(Decision::Deny);
        };

        if user.role == "admin" {
            return Ok(Decision::Allow);
        }
        if self.is_restricted(object, action) {
            return Ok(Decision::Deny);
        }
        Ok(Decision::Allow)
    }
}

/// Test double with a fixed decision and an optional failure mode.
pub struct StaticPermissionService {
    decision: Decision,
    fail: bool,
}

impl StaticPermissionService {
    pub fn allow_all() -> Arc<Self> {
        Arc::new(Self {
            decision: Decision::Allow,
            fail: false,
        })
    }

    pub fn deny_all() -> Arc<Self> {
        Arc::new(Self {
            decision: Decision::Deny,
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            decision: Decision::Deny,
            fail: true,
        })
    }
}

#[async_trait]
impl PermissionService for StaticPermissionService {
    async fn check(&self, _username: &str, _object: &str, _action: &str) -> Result<Decision, TrackError> {
        if self.fail {
            return Err(TrackError::PermissionServiceError("permission backend unreachable".into()));
        }
        Ok(self.decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::SqliteStore;
    use worktrack_domain::entities::User;
    use worktrack_domain::value_objects::UserId;

    async fn service_with(role: &str) -> RolePermissionService {
        let store = SqliteStore::in_memory().await.unwrap();
        let users = UserRepository::new(store);
        users
            .insert(&User {
                id: UserId::new(),
                username: "alice".into(),
                email: "alice@example.com".into(),
                password_hash: "$argon2id$stub".into(),
                name: "Alice".into(),
                role: role.into(),
                created: 1,
                modified: 1,
                deleted: false,
            })
            .await
            .unwrap();
        RolePermissionService::new(users)
    }

    #[tokio::test]
    async fn test_user_allowed_by_default() {
        let svc = service_with("user").await;
        assert_eq!(svc.check("alice", "ticket", "create").await.unwrap(), Decision::Allow);
    }

    #[tokio::test]
    async fn test_restricted_action_denied_for_user() {
        let svc = service_with("user").await;
        svc.restrict("project", "remove");
        assert_eq!(svc.check("alice", "project", "remove").await.unwrap(), Decision::Deny);
        assert_eq!(svc.check("alice", "project", "read").await.unwrap(), Decision::Allow);
    }

    #[tokio::test]
    async fn test_admin_bypasses_restrictions() {
        let svc = service_with("admin").await;
        svc.restrict("project", "remove");
        assert_eq!(svc.check("alice", "project", "remove").await.unwrap(), Decision::Allow);
    }

    #[tokio::test]
    async fn test_unknown_user_denied() {
        let svc = service_with("user").await;
        assert_eq!(svc.check("ghost", "ticket", "read").await.unwrap(), Decision::Deny);
    }
}
