// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Worktrack Bootstrap
//!
//! Platform-facing startup glue for the server binary: tracing
//! initialization, graceful-shutdown coordination, signal handling, and
//! process exit codes. Application logic lives in the `worktrack` crate;
//! this crate only gets the process started and stopped cleanly.

pub mod exit_code;
pub mod logger;
pub mod shutdown;
pub mod signals;

// Re-export commonly used types
pub use exit_code::ExitCode;
pub use logger::{init_tracing, DEFAULT_LOG_FILTER};
pub use shutdown::{CancellationToken, ShutdownCoordinator, DEFAULT_GRACE_PERIOD_SECS};
pub use signals::{platform_signals, ShutdownCallback, SystemSignals};
