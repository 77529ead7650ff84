// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Envelope field extraction.
//!
//! Shared by every handler: required strings must be present and non-empty
//! (`MissingData`), numeric fields are truncated from JSON floats before
//! range checks, unknown fields are ignored by simply never being read.

use serde_json::{Map, Value};

use worktrack_domain::TrackError;

/// A required, non-empty string field.
pub fn require_str(data: &Map<String, Value>, field: &str) -> Result<String, TrackError> {
    match data.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | None | Some(Value::Null) => Err(TrackError::missing_data(field)),
        Some(_) => Err(TrackError::invalid_data(format!("{} must be a string", field))),
    }
}

/// An optional string field; absent, null, and empty all read as `None`.
pub fn opt_str(data: &Map<String, Value>, field: &str) -> Result<Option<String>, TrackError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(s.clone()))
            }
        }
        Some(_) => Err(TrackError::invalid_data(format!("{} must be a string", field))),
    }
}

/// A required integer field; JSON floats are truncated.
pub fn require_i64(data: &Map<String, Value>, field: &str) -> Result<i64, TrackError> {
    match data.get(field) {
        Some(Value::Number(n)) => number_to_i64(n, field),
        None | Some(Value::Null) => Err(TrackError::missing_data(field)),
        Some(_) => Err(TrackError::invalid_data(format!("{} must be a number", field))),
    }
}

/// An optional integer field; JSON floats are truncated.
pub fn opt_i64(data: &Map<String, Value>, field: &str) -> Result<Option<i64>, TrackError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => number_to_i64(n, field).map(Some),
        Some(_) => Err(TrackError::invalid_data(format!("{} must be a number", field))),
    }
}

/// An optional boolean field.
pub fn opt_bool(data: &Map<String, Value>, field: &str) -> Result<Option<bool>, TrackError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(TrackError::invalid_data(format!("{} must be a boolean", field))),
    }
}

/// An optional array of strings.
pub fn opt_str_array(data: &Map<String, Value>, field: &str) -> Result<Vec<String>, TrackError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(s.clone()),
                _ => Err(TrackError::invalid_data(format!("{} must contain strings", field))),
            })
            .collect(),
        Some(_) => Err(TrackError::invalid_data(format!("{} must be an array", field))),
    }
}

/// Does the patch touch any of the named mutable fields?
///
/// A modify call whose data carries none of them (beyond the id and the
/// ignored `modified` pseudo-field) is an empty patch.
pub fn touches_any(data: &Map<String, Value>, fields: &[&str]) -> bool {
    fields.iter().any(|f| data.contains_key(*f))
}

fn number_to_i64(n: &serde_json::Number, field: &str) -> Result<i64, TrackError> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if let Some(f) = n.as_f64() {
        // Inbound JSON numerals arrive as floating point; integer fields
        // truncate, never compare with float equality.
        return Ok(f.trunc() as i64);
    }
    Err(TrackError::invalid_data(format!("{} is out of range", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_require_str() {
        let d = data(json!({"title": "x", "empty": "  "}));
        assert_eq!(require_str(&d, "title").unwrap(), "x");
        assert!(matches!(require_str(&d, "empty"), Err(TrackError::MissingData(_))));
        assert!(matches!(require_str(&d, "absent"), Err(TrackError::MissingData(_))));
    }

    #[test]
    fn test_wrong_type_is_invalid_not_missing() {
        let d = data(json!({"title": 7}));
        assert!(matches!(require_str(&d, "title"), Err(TrackError::InvalidData(_))));
    }

    #[test]
    fn test_numbers_truncate_floats() {
        let d = data(json!({"level": 3.9, "type": 100.0, "neg": -2.7}));
        assert_eq!(require_i64(&d, "level").unwrap(), 3);
        assert_eq!(require_i64(&d, "type").unwrap(), 100);
        assert_eq!(require_i64(&d, "neg").unwrap(), -2);
    }

    #[test]
    fn test_opt_str_treats_empty_as_absent() {
        let d = data(json!({"a": "", "b": null, "c": "v"}));
        assert_eq!(opt_str(&d, "a").unwrap(), None);
        assert_eq!(opt_str(&d, "b").unwrap(), None);
        assert_eq!(opt_str(&d, "c").unwrap(), Some("v".into()));
        assert_eq!(opt_str(&d, "d").unwrap(), None);
    }

    #[test]
    fn test_touches_any() {
        let d = data(json!({"id": "x", "modified": 5, "title": "t"}));
        assert!(touches_any(&d, &["title", "description"]));
        assert!(!touches_any(&d, &["description", "icon"]));
    }

    #[test]
    fn test_opt_str_array() {
        let d = data(json!({"mentions": ["u1", "u2"], "bad": [1]}));
        assert_eq!(opt_str_array(&d, "mentions").unwrap(), vec!["u1", "u2"]);
        assert!(opt_str_array(&d, "bad").is_err());
        assert!(opt_str_array(&d, "absent").unwrap().is_empty());
    }
}
