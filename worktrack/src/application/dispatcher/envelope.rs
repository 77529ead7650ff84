// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Request and Response Envelopes
//!
//! Every call on the action endpoint uses one wrapper in each direction:
//!
//! ```json
//! { "action": "ticket.create", "data": { "title": "…" } }
//! ```
//!
//! ```json
//! { "errorCode": 0, "errorMessage": "", "data": { "id": "…" } }
//! ```
//!
//! The HTTP status travels outside the body and is derived from the error
//! class; `errorCode` 0 is success.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use worktrack_domain::TrackError;

/// The inbound action envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestEnvelope {
    pub action: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl RequestEnvelope {
    /// Decodes an envelope from a raw JSON body.
    pub fn decode(body: &Value) -> Result<Self, TrackError> {
        let envelope: RequestEnvelope = serde_json::from_value(body.clone())
            .map_err(|e| TrackError::invalid_request(format!("malformed envelope: {}", e)))?;
        if envelope.action.trim().is_empty() {
            return Err(TrackError::invalid_request("envelope is missing an action tag"));
        }
        Ok(envelope)
    }
}

/// The outbound envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub error_code: i32,
    pub error_message: String,
    pub data: Map<String, Value>,
}

impl ResponseEnvelope {
    pub fn ok(data: Map<String, Value>) -> Self {
        Self {
            error_code: 0,
            error_message: String::new(),
            data,
        }
    }

    pub fn error(err: &TrackError) -> Self {
        Self {
            error_code: err.error_code(),
            error_message: err.to_string(),
            data: Map::new(),
        }
    }
}

/// A handler's successful outcome: HTTP status plus response data.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub status: u16,
    pub data: Map<String, Value>,
}

impl HandlerOutcome {
    /// 200 with data — reads, modifies, detaches.
    pub fn ok(data: Map<String, Value>) -> Self {
        Self { status: 200, data }
    }

    /// 201 with data — creates and attaches.
    pub fn created(data: Map<String, Value>) -> Self {
        Self { status: 201, data }
    }

    /// Wraps a serializable entity as `{...entity fields...}`.
    pub fn of_entity<T: Serialize>(status: u16, entity: &T) -> Result<Self, TrackError> {
        match serde_json::to_value(entity) {
            Ok(Value::Object(map)) => Ok(Self { status, data: map }),
            Ok(_) => Err(TrackError::internal_error("entity did not serialize to an object")),
            Err(e) => Err(TrackError::internal_error(format!("serialization failed: {}", e))),
        }
    }

    /// Wraps a list as `{"items": [...], "total": n}`.
    pub fn of_list<T: Serialize>(items: &[T]) -> Result<Self, TrackError> {
        let values = serde_json::to_value(items)
            .map_err(|e| TrackError::internal_error(format!("serialization failed: {}", e)))?;
        let mut data = Map::new();
        data.insert("items".to_string(), values);
        data.insert("total".to_string(), Value::from(items.len()));
        Ok(Self { status: 200, data })
    }
}
