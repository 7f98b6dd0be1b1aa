// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Collection Metadata
//!
//! The persisted bookkeeping record of a collection, stored as
//! `<collection>/_metadata.json` and rewritten whole on every change.
//!
//! `document_order` is the stable enumeration order of the collection: every
//! document id appears exactly once and `count == document_order.len()` at
//! all times. The collection controller serializes every read-modify-write of
//! this structure through one async mutex, so concurrent mutations cannot
//! lose updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File name of the metadata record inside a collection directory.
pub const METADATA_FILE: &str = "_metadata.json";

/// Persisted collection bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadata {
    /// Number of documents in the collection
    pub count: u64,
    /// Field specs of the collection's indexes
    pub indices: Vec<String>,
    /// Creation instant of the collection
    pub created: DateTime<Utc>,
    /// Instant of the last mutation
    pub updated: DateTime<Utc>,
    /// Stable enumeration order of all document ids
    pub document_order: Vec<String>,
}

impl CollectionMetadata {
    /// Fresh metadata for a newly created collection.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            count: 0,
            indices: Vec::new(),
            created: now,
            updated: now,
            document_order: Vec::new(),
        }
    }

    /// Position of a document id in the enumeration order, `-1` when absent.
    pub fn position_of(&self, doc_id: &str) -> i64 {
        self.document_order
            .iter()
            .position(|id| id == doc_id)
            .map(|p| p as i64)
            .unwrap_or(-1)
    }
}

impl Default for CollectionMetadata {
    fn default() -> Self {
        Self::new()
    }
}
