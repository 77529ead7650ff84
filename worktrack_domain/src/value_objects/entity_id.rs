// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic Entity ID Value Object
//!
//! Type-safe identifiers for every persisted entity family. Ids are ULIDs
//! (Universally Unique Lexicographically Sortable Identifiers) wrapped in a
//! phantom-typed value object so a `TicketId` can never be passed where a
//! `ProjectId` is expected.
//!
//! ## Key Properties
//!
//! - **Opaque on the wire**: serialized as the 26-character ULID string
//! - **Time-ordered**: lexicographic order follows creation time, which keeps
//!   primary-key inserts sequential and makes `created DESC` scans cheap
//! - **Zero-cost categories**: the phantom parameter exists only at compile
//!   time
//!
//! ## Usage
//!
//! ```
//! use worktrack_domain::value_objects::{EntityId, TicketIdCategory};
//!
//! type TicketId = EntityId<TicketIdCategory>;
//! let id = TicketId::new();
//! let parsed: TicketId = id.to_string().parse().unwrap();
//! assert_eq!(id, parsed);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use ulid::Ulid;

use crate::error::TrackError;

/// ID category trait for type-specific behavior.
///
/// Each entity family declares a category type implementing this trait; the
/// category name shows up in validation messages and logs.
pub trait IdCategory {
    /// Gets the category name for this ID type
    fn category_name() -> &'static str;

    /// Validates category-specific constraints
    fn validate_id(ulid: &Ulid) -> Result<(), TrackError> {
        if *ulid == Ulid::nil() {
            return Err(TrackError::invalid_data(format!(
                "{} id cannot be nil",
                Self::category_name()
            )));
        }
        Ok(())
    }
}

/// Generic identifier value object for domain entities.
///
/// This is the base implementation that the per-family aliases in
/// [`super::ids`] build on. It should not be used with an ad-hoc category;
/// use the declared aliases (`TicketId`, `ProjectId`, …) instead.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct EntityId<T: IdCategory> {
    value: Ulid,
    _phantom: std::marker::PhantomData<T>,
}

// Serialized as the bare ULID string, not a JSON object.
impl<T: IdCategory> Serialize for EntityId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.to_string().serialize(serializer)
    }
}

impl<'de, T: IdCategory> Deserialize<'de> for EntityId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ulid = Ulid::from_string(&s).map_err(|e| serde::de::Error::custom(e.to_string()))?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }
}

impl<T: IdCategory> EntityId<T> {
    /// Creates a new time-ordered entity ID.
    pub fn new() -> Self {
        Self {
            value: Ulid::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Creates an entity ID from an existing ULID with validation
    pub fn from_ulid(ulid: Ulid) -> Result<Self, TrackError> {
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Creates an entity ID from its 26-character string representation.
    pub fn from_string(s: &str) -> Result<Self, TrackError> {
        let ulid = Ulid::from_str(s)
            .map_err(|_| TrackError::invalid_data(format!("invalid {} id: {}", T::category_name(), s)))?;
        Self::from_ulid(ulid)
    }

    /// Gets the underlying ULID value
    pub fn as_ulid(&self) -> Ulid {
        self.value
    }

    /// Milliseconds since the Unix epoch encoded in the id.
    pub fn timestamp_ms(&self) -> u64 {
        self.value.timestamp_ms()
    }

    /// Gets the ID category name
    pub fn category(&self) -> &'static str {
        T::category_name()
    }

    /// Checks if this is a nil (zero) ULID
    pub fn is_nil(&self) -> bool {
        self.value.0 == 0
    }
}

impl<T: IdCategory> Default for EntityId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IdCategory> Display for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: IdCategory> Hash for EntityId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdCategory> FromStr for EntityId<T> {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct TestCategory;
    impl IdCategory for TestCategory {
        fn category_name() -> &'static str {
            "test"
        }
    }

    type TestId = EntityId<TestCategory>;

    #[test]
    fn test_new_ids_are_unique() {
        let a = TestId::new();
        let b = TestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_string_round_trip() {
        let id = TestId::new();
        let parsed = TestId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(TestId::from_string("not-a-ulid").is_err());
    }

    #[test]
    fn test_rejects_nil() {
        assert!(TestId::from_ulid(Ulid::nil()).is_err());
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let id = TestId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: TestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
