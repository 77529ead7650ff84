// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Priority level value object.
//!
//! A priority carries an integer level in {1..5}. No business rule is
//! attached to the number beyond ordering; 1 sorts first in priority lists.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TrackError;

/// Validated priority level, 1 through 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityLevel(u8);

impl PriorityLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validates and wraps a level.
    pub fn new(level: i64) -> Result<Self, TrackError> {
        if !(Self::MIN as i64..=Self::MAX as i64).contains(&level) {
            return Err(TrackError::invalid_data(format!(
                "priority level must be between {} and {}; got {}",
                Self::MIN,
                Self::MAX,
                level
            )));
        }
        Ok(Self(level as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for PriorityLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for PriorityLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Truncate inbound JSON floats before range-checking.
        let raw = f64::deserialize(deserializer)?;
        PriorityLevel::new(raw.trunc() as i64).map_err(serde::de::Error::custom)
    }
}
