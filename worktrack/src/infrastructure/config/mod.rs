// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Configuration loading.

pub mod config_service;

pub use config_service::{AppConfig, AuthSettings, ConfigService, DatabaseSettings, EventSettings, ServerSettings};
