// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Server binary: wire the layers together, serve, shut down cleanly.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use worktrack::application::AppContext;
use worktrack::infrastructure::auth::TokenService;
use worktrack::infrastructure::config::{AppConfig, ConfigService};
use worktrack::infrastructure::events::EventHub;
use worktrack::infrastructure::permission::RolePermissionService;
use worktrack::infrastructure::repositories::{SqliteStore, UserRepository};
use worktrack::presentation::{router, AppState};
use worktrack_bootstrap::{init_tracing, platform_signals, ExitCode, ShutdownCoordinator};
use worktrack_domain::services::SystemClock;

/// Work-tracking control plane server.
#[derive(Debug, Parser)]
#[command(name = "worktrack", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "worktrack.toml")]
    config: String,

    /// Override the bind address from the config.
    #[arg(long)]
    bind: Option<String>,

    /// Override the database path from the config.
    #[arg(long)]
    database_path: Option<String>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing(None);
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::Success.into(),
        Err(exit_code) => exit_code.into(),
    }
}

async fn run(cli: Cli) -> Result<(), ExitCode> {
    let mut config: AppConfig = ConfigService::load(&cli.config).await.map_err(|e| {
        error!(error = %e, "configuration error");
        ExitCode::DataError
    })?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(path) = cli.database_path {
        config.database.path = path;
    }

    let store = SqliteStore::open(&config.database.path, config.database.max_connections)
        .await
        .map_err(|e| {
            error!(error = %e, path = %config.database.path, "cannot open database");
            ExitCode::Unavailable
        })?;

    let permissions = Arc::new(RolePermissionService::new(UserRepository::new(store.clone())));
    let hub = EventHub::start(permissions.clone(), &config.events);
    let tokens = TokenService::new(&config.auth.token_secret, config.auth.token_ttl_secs);

    let ctx = Arc::new(AppContext::new(
        store,
        Arc::new(SystemClock),
        permissions,
        hub,
        tokens,
    ));
    let state = AppState::new(ctx);

    let coordinator = ShutdownCoordinator::new(Duration::from_secs(config.server.shutdown_grace_secs));
    let signal_coordinator = coordinator.clone();
    tokio::spawn(async move {
        platform_signals()
            .wait_for_signal(Box::new(move || signal_coordinator.initiate_shutdown()))
            .await;
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await.map_err(|e| {
        error!(error = %e, bind = %config.server.bind, "cannot bind listener");
        ExitCode::Unavailable
    })?;
    info!(bind = %config.server.bind, "worktrack listening");

    let shutdown_token = coordinator.token();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await
        .map_err(|e| {
            error!(error = %e, "server error");
            ExitCode::Software
        })?;

    info!("worktrack stopped");
    Ok(())
}
