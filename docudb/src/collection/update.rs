// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Update Operators
//!
//! Applies an update document to a current document, producing the new
//! version. Two shapes are accepted:
//!
//! - **Operator form**: every top-level key is one of `$set`, `$unset`,
//!   `$inc`, `$push`, `$pull`, `$addToSet`; any other `$`-key fails with
//!   `InvalidUpdate`. Operator payloads map dot-paths to operands.
//! - **Replacement shorthand**: no `$`-keys at all; the update is
//!   shallow-merged over the current document, always preserving `_id`.
//!
//! Mixing the two shapes is rejected. The input documents are never mutated;
//! the function returns the new version.

use serde_json::{Map, Value};

use docudb_domain::document::deep_equal;
use docudb_domain::{FieldPath, StoreError};

/// Applies an update to `current`, returning the updated document.
pub fn apply_update(current: &Value, update: &Value) -> Result<Value, StoreError> {
    let update_map = update
        .as_object()
        .ok_or_else(|| StoreError::InvalidUpdate("update must be a JSON object".to_string()))?;

    let has_operators = update_map.keys().any(|k| k.starts_with('$'));
    if !has_operators {
        return Ok(replace(current, update_map));
    }

    let mut doc = current.clone();
    for (operator, payload) in update_map {
        let payload = payload.as_object().ok_or_else(|| {
            StoreError::InvalidUpdate(format!("{} requires an object of field paths", operator))
        })?;
        match operator.as_str() {
            "$set" => {
                for (path, value) in payload {
                    FieldPath::new(path.as_str()).set(&mut doc, value.clone());
                }
            }
            "$unset" => {
                for path in payload.keys() {
                    FieldPath::new(path.as_str()).unset(&mut doc);
                }
            }
            "$inc" => apply_inc(&mut doc, payload)?,
            "$push" => apply_push(&mut doc, payload)?,
            "$pull" => apply_pull(&mut doc, payload)?,
            "$addToSet" => apply_add_to_set(&mut doc, payload)?,
            other if other.starts_with('$') => {
                return Err(StoreError::InvalidUpdate(format!("unknown update operator '{}'", other)));
            }
            other => {
                return Err(StoreError::InvalidUpdate(format!(
                    "cannot mix plain field '{}' with update operators",
                    other
                )));
            }
        }
    }

    // Operators can target _id through $set/$unset; the identity is immutable.
    if let (Some(map), Some(id)) = (doc.as_object_mut(), current.get("_id")) {
        map.insert("_id".to_string(), id.clone());
    }
    Ok(doc)
}

/// Replacement shorthand: shallow-merge `update` over `current`, keeping
/// `_id`.
fn replace(current: &Value, update: &Map<String, Value>) -> Value {
    let mut merged = current.as_object().cloned().unwrap_or_default();
    for (key, value) in update {
        merged.insert(key.clone(), value.clone());
    }
    if let Some(id) = current.get("_id") {
        merged.insert("_id".to_string(), id.clone());
    }
    Value::Object(merged)
}

fn apply_inc(doc: &mut Value, payload: &Map<String, Value>) -> Result<(), StoreError> {
    for (path, operand) in payload {
        let delta = operand
            .as_f64()
            .ok_or_else(|| StoreError::InvalidUpdate(format!("$inc on '{}' requires a numeric operand", path)))?;
        let field_path = FieldPath::new(path.as_str());

        let current = match field_path.resolve(doc) {
            // Absent counts as zero
            None => 0.0,
            Some(value) => value.as_f64().ok_or_else(|| {
                StoreError::InvalidType(format!("$inc target '{}' holds a non-numeric value", path))
            })?,
        };

        let next = current + delta;
        // Keep integral results as JSON integers so counters round-trip
        // without a fractional part.
        let next = if next.fract() == 0.0 && next.abs() < 9_007_199_254_740_992.0 {
            Value::from(next as i64)
        } else {
            Value::from(next)
        };
        field_path.set(doc, next);
    }
    Ok(())
}

fn apply_push(doc: &mut Value, payload: &Map<String, Value>) -> Result<(), StoreError> {
    for (path, operand) in payload {
        let field_path = FieldPath::new(path.as_str());
        match field_path.resolve(doc) {
            None => field_path.set(doc, Value::Array(vec![operand.clone()])),
            Some(Value::Array(items)) => {
                let mut items = items.clone();
                items.push(operand.clone());
                field_path.set(doc, Value::Array(items));
            }
            Some(_) => {
                return Err(StoreError::InvalidType(format!(
                    "$push target '{}' holds a non-array value",
                    path
                )));
            }
        }
    }
    Ok(())
}

fn apply_pull(doc: &mut Value, payload: &Map<String, Value>) -> Result<(), StoreError> {
    for (path, operand) in payload {
        let field_path = FieldPath::new(path.as_str());
        match field_path.resolve(doc) {
            // Absent target is a no-op
            None => {}
            Some(Value::Array(items)) => {
                let remaining: Vec<Value> = items.iter().filter(|item| !deep_equal(item, operand)).cloned().collect();
                field_path.set(doc, Value::Array(remaining));
            }
            Some(_) => {
                return Err(StoreError::InvalidType(format!(
                    "$pull target '{}' holds a non-array value",
                    path
                )));
            }
        }
    }
    Ok(())
}

fn apply_add_to_set(doc: &mut Value, payload: &Map<String, Value>) -> Result<(), StoreError> {
    for (path, operand) in payload {
        let field_path = FieldPath::new(path.as_str());
        match field_path.resolve(doc) {
            None => field_path.set(doc, Value::Array(vec![operand.clone()])),
            Some(Value::Array(items)) => {
                if !items.iter().any(|item| deep_equal(item, operand)) {
                    let mut items = items.clone();
                    items.push(operand.clone());
                    field_path.set(doc, Value::Array(items));
                }
            }
            Some(_) => {
                return Err(StoreError::InvalidType(format!(
                    "$addToSet target '{}' holds a non-array value",
                    path
                )));
            }
        }
    }
    Ok(())
}
