// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Path-Safe Name Value Objects
//!
//! Database and collection names become directory names under the data root,
//! so both are validated against a path-sanitization pass before any
//! filesystem operation happens. A name that survives construction can be
//! joined onto a path without escaping the data directory.
//!
//! ## Validation Rules
//!
//! - non-empty, at most 64 characters
//! - no control characters
//! - no path separators (`/`, `\`) and no traversal (`..`, leading `.`)
//! - no URL-encoded traversal sequences (`%2e`, `%2f`, `%5c`, any case)
//! - no template-injection syntax (`${`, `{{`, `<%`)
//! - not a reserved system device name (`con`, `prn`, `aux`, `nul`,
//!   `com1`-`com9`, `lpt1`-`lpt9`)

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const MAX_NAME_LEN: usize = 64;

const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8", "com9", "lpt1",
    "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Runs the shared sanitization pass. `what` names the kind being validated
/// so error messages identify their subject.
fn validate_name(what: &str, name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidName(format!("{} name cannot be empty", what)));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(StoreError::InvalidName(format!(
            "{} name '{}' exceeds maximum length of {} characters",
            what, name, MAX_NAME_LEN
        )));
    }

    if name.chars().any(|c| c.is_control()) {
        return Err(StoreError::InvalidName(format!(
            "{} name contains control characters",
            what
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(StoreError::InvalidName(format!(
            "{} name '{}' contains path separators",
            what, name
        )));
    }

    if name.contains("..") || name.starts_with('.') {
        return Err(StoreError::InvalidName(format!(
            "{} name '{}' contains path traversal",
            what, name
        )));
    }

    let lowered = name.to_ascii_lowercase();
    if lowered.contains("%2e") || lowered.contains("%2f") || lowered.contains("%5c") {
        return Err(StoreError::InvalidName(format!(
            "{} name '{}' contains URL-encoded path characters",
            what, name
        )));
    }

    if name.contains("${") || name.contains("{{") || name.contains("<%") {
        return Err(StoreError::InvalidName(format!(
            "{} name '{}' contains template syntax",
            what, name
        )));
    }

    if RESERVED_NAMES.contains(&lowered.as_str()) {
        return Err(StoreError::InvalidName(format!(
            "{} name '{}' is a reserved system name",
            what, name
        )));
    }

    Ok(())
}

/// Validated database (data root directory) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// Creates a database name, running the path-sanitization pass.
    pub fn new(name: impl Into<String>) -> Result<Self, StoreError> {
        let name = name.into();
        validate_name("database", &name)?;
        Ok(DatabaseName(name))
    }

    /// Gets the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated collection (subdirectory) name.
///
/// Names starting with `_` are additionally rejected: underscore-prefixed
/// entries under the data root are reserved for engine bookkeeping
/// (`_metadata.json`, `_indices/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionName(String);

impl CollectionName {
    /// Creates a collection name, running the path-sanitization pass.
    pub fn new(name: impl Into<String>) -> Result<Self, StoreError> {
        let name = name.into();
        validate_name("collection", &name)?;
        if name.starts_with('_') {
            return Err(StoreError::InvalidName(format!(
                "collection name '{}' cannot start with '_' (reserved for engine files)",
                name
            )));
        }
        Ok(CollectionName(name))
    }

    /// Gets the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
