// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Identifier Value Object
//!
//! This module provides the identifier service for the DocuDB storage engine:
//! generation and validation of the two supported document identifier formats.
//!
//! ## Identifier Formats
//!
//! - **MongoDB-style**: 24 lowercase hexadecimal characters drawn from 12
//!   random bytes (`^[0-9a-f]{24}$`)
//! - **UUIDv4**: canonical hyphenated form, case-insensitive, with the version
//!   nibble fixed to `4` and the variant nibble in `{8, 9, a, b}`
//!
//! ## Design
//!
//! `DocumentId` is a validated newtype: any instance in circulation is known
//! to match one of the two formats, so downstream code never re-checks. The
//! free functions [`is_valid_id`], [`is_valid_mongo_id`] and [`is_valid_uuid`]
//! are exported for callers that hold plain strings (for example, ids arriving
//! inside raw documents).

use once_cell::sync::Lazy;
use rand::RngCore;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

static MONGO_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-f]{24}$").unwrap());

static UUID_V4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$").unwrap()
});

/// Identifier format generated for documents inserted without an `_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    /// MongoDB-style 24-hex identifier
    #[default]
    Mongo,
    /// UUIDv4 identifier
    Uuid,
}

impl std::fmt::Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::Mongo => write!(f, "mongo"),
            IdKind::Uuid => write!(f, "uuid"),
        }
    }
}

/// Validated document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generates a fresh identifier of the given kind.
    pub fn generate(kind: IdKind) -> Self {
        match kind {
            IdKind::Mongo => {
                let mut bytes = [0u8; 12];
                rand::rng().fill_bytes(&mut bytes);
                DocumentId(hex::encode(bytes))
            }
            IdKind::Uuid => DocumentId(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Wraps an existing identifier string, validating its format.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidId` when the string matches neither the
    /// 24-hex nor the UUIDv4 format.
    pub fn parse(s: impl Into<String>) -> Result<Self, StoreError> {
        let s = s.into();
        if is_valid_id(&s) {
            Ok(DocumentId(s))
        } else {
            Err(StoreError::InvalidId(format!(
                "'{}' is neither a 24-hex nor a UUIDv4 identifier",
                s
            )))
        }
    }

    /// Gets the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier, returning the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns true iff `s` is a MongoDB-style 24-hex identifier.
pub fn is_valid_mongo_id(s: &str) -> bool {
    MONGO_ID_RE.is_match(s)
}

/// Returns true iff `s` is a UUIDv4 string (version nibble `4`, variant
/// nibble in `{8, 9, a, b}`).
pub fn is_valid_uuid(s: &str) -> bool {
    UUID_V4_RE.is_match(s)
}

/// Returns true iff `s` matches either supported identifier format.
pub fn is_valid_id(s: &str) -> bool {
    is_valid_mongo_id(s) || is_valid_uuid(s)
}
