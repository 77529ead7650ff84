// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Configuration
//!
//! Typed TOML configuration with defaults and a validation pass. A missing
//! file falls back to defaults with a warning; a malformed file is an error.
//! The token secret may be supplied through `WORKTRACK_TOKEN_SECRET`, which
//! takes precedence over the file so secrets stay out of checked-in config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use worktrack_domain::TrackError;

/// Complete server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub events: EventSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address, e.g. "127.0.0.1:8080".
    pub bind: String,
    /// Seconds granted to in-flight work on shutdown.
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing secret; overridden by WORKTRACK_TOKEN_SECRET.
    pub token_secret: String,
    pub token_ttl_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Publish queue capacity; publishing never blocks, overflow drops.
    pub publish_buffer: usize,
    /// Per-subscriber outbound queue capacity.
    pub subscriber_buffer: usize,
    /// Consecutive drops before a slow subscriber is disconnected.
    pub max_consecutive_drops: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            shutdown_grace_secs: 5,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "worktrack.db".to_string(),
            max_connections: 8,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: 24 * 3600,
        }
    }
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            publish_buffer: 1024,
            subscriber_buffer: 64,
            max_consecutive_drops: 32,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            auth: AuthSettings::default(),
            events: EventSettings::default(),
        }
    }
}

impl AppConfig {
    /// Validates cross-field constraints.
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.server.bind.trim().is_empty() {
            return Err(TrackError::invalid_data("server.bind cannot be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(TrackError::invalid_data("database.max_connections must be at least 1"));
        }
        if self.auth.token_secret.trim().is_empty() {
            return Err(TrackError::invalid_data(
                "auth.token_secret is required (file or WORKTRACK_TOKEN_SECRET)",
            ));
        }
        if self.auth.token_ttl_secs <= 0 {
            return Err(TrackError::invalid_data("auth.token_ttl_secs must be positive"));
        }
        if self.events.publish_buffer == 0 || self.events.subscriber_buffer == 0 {
            return Err(TrackError::invalid_data("event buffers must be at least 1"));
        }
        if self.events.max_consecutive_drops == 0 {
            return Err(TrackError::invalid_data("events.max_consecutive_drops must be at least 1"));
        }
        Ok(())
    }
}

/// Loader for [`AppConfig`].
pub struct ConfigService;

impl ConfigService {
    /// Loads configuration from a TOML file, environment on top.
    ///
    /// A missing file yields defaults (with a warning); the environment
    /// override applies either way. Validation runs last.
    pub async fn load<P: AsRef<Path>>(config_path: P) -> Result<AppConfig, TrackError> {
        let config_path = config_path.as_ref();

        let mut config = if config_path.exists() {
            let raw = fs::read_to_string(config_path)
                .await
                .map_err(|e| TrackError::internal_error(format!("cannot read config {:?}: {}", config_path, e)))?;
            let parsed: AppConfig = toml::from_str(&raw)
                .map_err(|e| TrackError::invalid_data(format!("malformed config {:?}: {}", config_path, e)))?;
            debug!(path = ?config_path, "loaded configuration file");
            parsed
        } else {
            warn!(path = ?config_path, "config file not found, using defaults");
            AppConfig::default()
        };

        if let Ok(secret) = std::env::var("WORKTRACK_TOKEN_SECRET") {
            config.auth.token_secret = secret;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.token_secret = "a-long-enough-signing-secret".into();
        config
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.events.max_consecutive_drops, 32);
        assert_eq!(config.auth.token_ttl_secs, 24 * 3600);
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = AppConfig::default();
        assert!(matches!(config.validate(), Err(TrackError::InvalidData(_))));
        assert!(valid_config().validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_parses_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbind = \"0.0.0.0:9000\"\n\n[auth]\ntoken_secret = \"s3cret-s3cret-s3cret\"\n"
        )
        .unwrap();

        let config = ConfigService::load(file.path()).await.unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        // Unspecified sections keep their defaults.
        assert_eq!(config.events.publish_buffer, 1024);
    }

    #[tokio::test]
    async fn test_malformed_toml_is_invalid_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml [[[").unwrap();

        let err = ConfigService::load(file.path()).await.unwrap_err();
        assert!(matches!(err, TrackError::InvalidData(_)));
    }
}
