// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Equality Indexes
//!
//! An index maps normalized value keys to the list of document ids carrying
//! that value ("index buckets"). Indexes serve equality lookups only and may
//! be **unique** (at most one id per bucket), **sparse** (documents missing
//! the indexed field are omitted), and **compound** (the key is the
//! `'|'`-joined projection of several dot-paths).
//!
//! The in-memory structure is also the persisted structure: each index is
//! written as one JSON file `<collection>/_indices/<fieldSpec>.idx`, rewritten
//! whole on every change. [`manager::IndexManager`] owns the registry and the
//! persistence.

pub mod manager;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use docudb_domain::document::normalized_key;
use docudb_domain::FieldPath;

pub use manager::IndexManager;

/// Separator between components of a compound value key.
pub const COMPOUND_KEY_SEPARATOR: char = '|';

/// Separator between field names in a compound field spec.
pub const FIELD_SPEC_SEPARATOR: char = '+';

/// Options accepted at index creation.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Enforce at most one document per value key
    pub unique: bool,
    /// Omit documents missing the indexed field
    pub sparse: bool,
    /// Display name; defaults to the field spec
    pub name: Option<String>,
}

/// One equality index: metadata plus its buckets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub fields: Vec<String>,
    pub is_compound: bool,
    pub unique: bool,
    pub sparse: bool,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// normalized value key -> document ids
    pub entries: BTreeMap<String, Vec<String>>,
}

impl Index {
    /// Creates an empty index over the given fields.
    pub fn new(fields: Vec<String>, options: &IndexOptions) -> Self {
        let is_compound = fields.len() > 1;
        let spec = fields.join(&FIELD_SPEC_SEPARATOR.to_string());
        let now = Utc::now();
        Self {
            fields,
            is_compound,
            unique: options.unique,
            sparse: options.sparse,
            name: options.name.clone().unwrap_or(spec),
            created: now,
            updated: now,
            entries: BTreeMap::new(),
        }
    }

    /// The registry key: the single field name, or the `'+'`-joined compound
    /// name.
    pub fn field_spec(&self) -> String {
        self.fields.join(&FIELD_SPEC_SEPARATOR.to_string())
    }

    /// Projects the indexed value key out of a document.
    ///
    /// Returns the normalized key plus whether the projection is absent: a
    /// simple index is absent when its field is missing, a compound index
    /// when every component is missing. Sparse indexes skip absent
    /// projections; everything else buckets them under the `undefined`
    /// rendering.
    pub fn project_key(&self, doc: &Value) -> (String, bool) {
        if self.is_compound {
            let components: Vec<Option<&Value>> = self
                .fields
                .iter()
                .map(|field| FieldPath::new(field.as_str()).resolve(doc))
                .collect();
            let absent = components.iter().all(Option::is_none);
            let key = components
                .iter()
                .map(|component| normalized_key(*component))
                .collect::<Vec<_>>()
                .join(&COMPOUND_KEY_SEPARATOR.to_string());
            (key, absent)
        } else {
            let value = FieldPath::new(self.fields[0].as_str()).resolve(doc);
            (normalized_key(value), value.is_none())
        }
    }

    /// Derives the lookup key for a queried value on a simple index.
    pub fn lookup_key(value: &Value) -> String {
        normalized_key(Some(value))
    }

    /// Removes every occurrence of a document id, dropping emptied buckets.
    pub fn remove_doc(&mut self, doc_id: &str) {
        self.entries.retain(|_, ids| {
            ids.retain(|id| id != doc_id);
            !ids.is_empty()
        });
    }

    /// Appends a document id under a value key.
    pub fn insert_doc(&mut self, key: String, doc_id: &str) {
        let bucket = self.entries.entry(key).or_default();
        if !bucket.iter().any(|id| id == doc_id) {
            bucket.push(doc_id.to_string());
        }
    }

    /// The id already holding a value key, if any.
    pub fn owner_of(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|ids| ids.first()).map(String::as_str)
    }
}
