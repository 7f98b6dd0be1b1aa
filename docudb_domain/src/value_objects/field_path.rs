// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Field Path Value Object
//!
//! Dot-notation path into a document tree (`"details.dimensions.width"`).
//! Field paths are the shared addressing scheme of the engine: the query
//! matcher resolves them, the index manager projects indexed values through
//! them, and the update operators (`$set`, `$unset`, `$inc`, ...) mutate
//! through them.
//!
//! Paths descend nested maps only; arrays are never implicitly traversed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parsed dot-notation path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath {
    raw: String,
}

impl FieldPath {
    /// Creates a field path from its dot-notation form.
    pub fn new(path: impl Into<String>) -> Self {
        FieldPath { raw: path.into() }
    }

    /// Gets the dot-notation form
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Gets the path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw.split('.')
    }

    /// True when the path addresses a top-level field.
    pub fn is_top_level(&self) -> bool {
        !self.raw.contains('.')
    }

    /// Resolves the path against a document, descending nested maps.
    ///
    /// Returns `None` when any segment is absent or an intermediate value is
    /// not a map. Distinguishing absent from `null` matters here: a resolved
    /// `Value::Null` is `Some(&Value::Null)`.
    pub fn resolve<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for segment in self.segments() {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Sets the value at this path, auto-creating intermediate maps.
    ///
    /// Any intermediate that is absent or not a map is replaced by a fresh
    /// map, mirroring MongoDB's `$set` behavior on non-object intermediates.
    pub fn set(&self, doc: &mut Value, value: Value) {
        let segments: Vec<&str> = self.segments().collect();
        if !doc.is_object() {
            *doc = Value::Object(Map::new());
        }
        let mut current = doc;
        for (i, segment) in segments.iter().enumerate() {
            let map = current.as_object_mut().expect("intermediate is always a map here");
            if i == segments.len() - 1 {
                map.insert((*segment).to_string(), value);
                return;
            }
            let entry = map
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry;
        }
    }

    /// Removes the value at this path.
    ///
    /// Silent when any intermediate is absent or not a map; returns the
    /// removed value when one existed.
    pub fn unset(&self, doc: &mut Value) -> Option<Value> {
        let segments: Vec<&str> = self.segments().collect();
        let mut current = doc;
        for (i, segment) in segments.iter().enumerate() {
            let map = current.as_object_mut()?;
            if i == segments.len() - 1 {
                return map.remove(*segment);
            }
            current = map.get_mut(*segment)?;
        }
        None
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        FieldPath::new(s)
    }
}

impl From<String> for FieldPath {
    fn from(s: String) -> Self {
        FieldPath::new(s)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}
