// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain error module.
//!
//! Re-exports the [`TrackError`] taxonomy used across every layer of the
//! system. See [`track_error`] for the full documentation.

pub mod track_error;

pub use track_error::TrackError;
