// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Logging
//!
//! One-shot tracing initialization for the server binary. The subscriber
//! honors `RUST_LOG`; the default filter keeps the server at `info` and
//! sqlx at `warn`. Everything after this point logs through `tracing`
//! macros directly.

use tracing_subscriber::{fmt, EnvFilter};

/// Default env-filter directive when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

/// Initializes the global tracing subscriber.
///
/// Safe to call once per process; a second call returns an error from the
/// subscriber registry which is reported, not panicked on.
pub fn init_tracing(filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or(DEFAULT_LOG_FILTER)));

    let result = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();

    if let Err(e) = result {
        eprintln!("tracing subscriber already initialized: {}", e);
    }
}
