// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Authentication Service
//!
//! Registration, login, and bearer verification over the user repository.
//!
//! Login failure is deliberately flat: an absent user and a wrong password
//! produce byte-identical `Unauthorized` responses, so the endpoint cannot
//! be used to probe which usernames exist.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::info;

use worktrack_domain::entities::{PublicUser, Registration, User, DEFAULT_ROLE};
use worktrack_domain::value_objects::UserId;
use worktrack_domain::{ActionClass, EventContext, TrackError};

use crate::application::context::AppContext;
use crate::infrastructure::auth::{hash_password, verify_password, Claims};

/// The one message every credential failure shows the client.
const BAD_CREDENTIALS: &str = "invalid username or password";

pub struct AuthService {
    ctx: Arc<AppContext>,
}

impl AuthService {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Registers a new account with the "user" role.
    pub async fn register(&self, registration: Registration) -> Result<PublicUser, TrackError> {
        registration.validate()?;

        if self.ctx.users.find_by_username(&registration.username).await?.is_some() {
            return Err(TrackError::already_exists(format!(
                "username {} is taken",
                registration.username
            )));
        }
        if self.ctx.users.find_by_email(&registration.email).await?.is_some() {
            return Err(TrackError::already_exists(format!(
                "email {} is taken",
                registration.email
            )));
        }

        let now = self.ctx.now();
        let user = User {
            id: UserId::new(),
            username: registration.username.clone(),
            email: registration.email.clone(),
            password_hash: hash_password(&registration.password)?,
            name: registration.name.clone(),
            role: DEFAULT_ROLE.to_string(),
            created: now,
            modified: now,
            deleted: false,
        };

        self.ctx.users.insert(&user).await?;
        info!(username = %user.username, "user registered");

        let mut payload = Map::new();
        payload.insert("id".into(), Value::String(user.id.to_string()));
        payload.insert("username".into(), Value::String(user.username.clone()));
        self.ctx.publish_change(
            ActionClass::Create,
            "user",
            &user.id.to_string(),
            &user.username,
            payload,
            EventContext::default(),
        );

        Ok(user.public())
    }

    /// Verifies credentials and issues a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(PublicUser, String), TrackError> {
        let user = self.ctx.users.find_by_username(username).await?;

        // Absent user and bad password take the same path to the same
        // message.
        let Some(user) = user else {
            return Err(TrackError::unauthorized(BAD_CREDENTIALS));
        };
        if !verify_password(password, &user.password_hash) {
            return Err(TrackError::unauthorized(BAD_CREDENTIALS));
        }

        let token = self
            .ctx
            .tokens
            .issue(&user.id.to_string(), &user.username, &user.role, self.ctx.now())?;

        info!(username = %user.username, "login succeeded");
        Ok((user.public(), token))
    }

    /// Verifies a bearer token and that its account is still live.
    pub async fn verify(&self, token: &str) -> Result<Claims, TrackError> {
        let claims = self.ctx.tokens.verify(token)?;
        match self.ctx.users.find_by_username(&claims.username).await? {
            Some(_) => Ok(claims),
            None => Err(TrackError::unauthorized("invalid or expired token")),
        }
    }
}
