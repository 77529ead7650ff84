// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Metadata entity.
//!
//! Free-form properties attached to any entity by id. At most one live row
//! per (entity, property); setting an existing property overwrites its
//! value in place.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::value_objects::MetadataId;

/// One property attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub id: MetadataId,
    pub entity_id: String,
    pub property: String,
    pub value: String,
    pub created: i64,
    pub modified: i64,
    #[serde(skip)]
    pub deleted: bool,
}

impl MetadataRecord {
    pub fn new(entity_id: String, property: String, value: String, now: i64) -> Self {
        Self {
            id: MetadataId::new(),
            entity_id,
            property,
            value,
            created: now,
            modified: now,
            deleted: false,
        }
    }

    pub fn validate(&self) -> Result<(), TrackError> {
        if self.entity_id.trim().is_empty() {
            return Err(TrackError::missing_data("entityId"));
        }
        if self.property.trim().is_empty() {
            return Err(TrackError::missing_data("property"));
        }
        Ok(())
    }
}
