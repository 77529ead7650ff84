// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Cycle Kind Value Object
//!
//! The closed enumeration of cycle kinds and the parent/child hierarchy rule.
//!
//! Cycle kinds look numeric on the wire ({10, 100, 1000}) but form a closed
//! enum: Sprint (10), Milestone (100), Release (1000). Internally the kind is
//! a sum type; the numeric value only appears at the serialization boundary.
//!
//! ## Hierarchy Rule
//!
//! A cycle may only nest under a strictly coarser cycle:
//!
//! - a Sprint may have a Milestone or Release parent
//! - a Milestone may have a Release parent
//! - a Release may not have a parent, and a Sprint may not parent anything
//!
//! Expressed numerically: `parent.value() > child.value()` strictly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TrackError;

/// A time-boxed grouping of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleKind {
    /// Short iteration, wire value 10.
    Sprint,
    /// Intermediate goal, wire value 100.
    Milestone,
    /// Shippable aggregation, wire value 1000.
    Release,
}

impl CycleKind {
    /// The numeric wire value of this kind.
    pub fn value(&self) -> i64 {
        match self {
            CycleKind::Sprint => 10,
            CycleKind::Milestone => 100,
            CycleKind::Release => 1000,
        }
    }

    /// Parses a wire value into a kind.
    ///
    /// Any value outside the closed set {10, 100, 1000} is `InvalidData`.
    /// Inbound JSON numbers arrive as floats; callers truncate before
    /// calling this.
    pub fn from_value(value: i64) -> Result<Self, TrackError> {
        match value {
            10 => Ok(CycleKind::Sprint),
            100 => Ok(CycleKind::Milestone),
            1000 => Ok(CycleKind::Release),
            other => Err(TrackError::invalid_data(format!(
                "cycle type must be one of 10 (sprint), 100 (milestone), 1000 (release); got {}",
                other
            ))),
        }
    }

    /// Checks the hierarchy rule: may `self` act as the parent of `child`?
    ///
    /// The rule is strict: a kind never parents itself or a coarser kind.
    pub fn may_parent(&self, child: CycleKind) -> bool {
        self.value() > child.value()
    }

    /// Human-readable kind name for logs and messages.
    pub fn name(&self) -> &'static str {
        match self {
            CycleKind::Sprint => "sprint",
            CycleKind::Milestone => "milestone",
            CycleKind::Release => "release",
        }
    }
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Serialized as the numeric wire value so clients see {10, 100, 1000}.
impl Serialize for CycleKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i64(self.value())
    }
}

impl<'de> Deserialize<'de> for CycleKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // JSON numerals may arrive as floats; truncate before matching.
        let raw = f64::deserialize(deserializer)?;
        CycleKind::from_value(raw.trunc() as i64).map_err(serde::de::Error::custom)
    }
}
