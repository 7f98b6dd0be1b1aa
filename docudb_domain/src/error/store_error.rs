// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! This module provides the hierarchical error system for the DocuDB storage
//! engine. Every failure that crosses a public API boundary is a
//! [`StoreError`] carrying a stable machine-readable code and a human-readable
//! message with operational context.
//!
//! ## Error Architecture
//!
//! Errors are organized into subsystem categories that mirror the engine's
//! component layout:
//!
//! - **Database**: lifecycle and registry failures (`NotInitialized`,
//!   `InvalidName`, `InitError`, `LoadError`, `CollectionError`)
//! - **Collection / Document**: CRUD and ordering failures (`InvalidDocument`,
//!   `InvalidId`, `NotFound`, `InsertError`, `UpdateError`, `DeleteError`,
//!   `LockError`, `InvalidPosition`)
//! - **Schema**: validation failures (`RequiredField`, `InvalidType`,
//!   `InvalidValue`, `InvalidLength`, `InvalidRegex`, `InvalidEnum`,
//!   `CustomValidation`, `InvalidField`)
//! - **Storage / Compression**: chunk persistence failures (`SaveError`,
//!   `ReadError`, `CompressError`, `DecompressError`)
//! - **Index**: equality-index failures (`CreateError`, `DropError`,
//!   `UniqueViolation`, `IndexSaveError`, `IndexLoadError`)
//! - **Query**: criteria compilation failures (`InvalidOperator`,
//!   `InvalidCriteria`)
//!
//! ## Propagation Policy
//!
//! Lower layers wrap the original error (I/O, serde) into the matching
//! subsystem variant; higher layers catch, attach operational context
//! (collection name, document id, field) into the message, and re-raise under
//! their own code. Only `StoreError` values ever reach callers.
//!
//! ## Recovery
//!
//! A small set of errors indicates transient conditions that may be retried:
//! lock contention and raw I/O failures. Everything else requires caller
//! intervention (fix the document, the schema, or the criteria).

use thiserror::Error;

/// Domain-specific errors for the DocuDB storage engine.
///
/// Each variant represents one failure code of the engine's error taxonomy.
/// The payload is the human-readable message; the stable machine code is
/// available via [`StoreError::code`] and the subsystem grouping via
/// [`StoreError::category`].
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    // --- Database ---
    #[error("Database not initialized: {0}")]
    NotInitialized(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Initialization failed: {0}")]
    InitError(String),

    #[error("Load failed: {0}")]
    LoadError(String),

    #[error("Collection error: {0}")]
    CollectionError(String),

    // --- Collection / document ---
    #[error("Metadata error: {0}")]
    MetadataError(String),

    #[error("Drop failed: {0}")]
    DropError(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insert failed: {0}")]
    InsertError(String),

    #[error("Update failed: {0}")]
    UpdateError(String),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Delete failed: {0}")]
    DeleteError(String),

    #[error("Query failed: {0}")]
    QueryError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    // --- Schema validation ---
    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Required field missing: {0}")]
    RequiredField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid length: {0}")]
    InvalidLength(String),

    #[error("Pattern mismatch: {0}")]
    InvalidRegex(String),

    #[error("Value not in enum: {0}")]
    InvalidEnum(String),

    #[error("Custom validation failed: {0}")]
    CustomValidation(String),

    #[error("Unknown field: {0}")]
    InvalidField(String),

    // --- Storage ---
    #[error("Save failed: {0}")]
    SaveError(String),

    #[error("Read failed: {0}")]
    ReadError(String),

    // --- Compression ---
    #[error("Compression failed: {0}")]
    CompressError(String),

    #[error("Decompression failed: {0}")]
    DecompressError(String),

    // --- Index ---
    #[error("Index creation failed: {0}")]
    CreateError(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Index save failed: {0}")]
    IndexSaveError(String),

    #[error("Index load failed: {0}")]
    IndexLoadError(String),

    #[error("Invalid indexed field type: {0}")]
    InvalidFieldType(String),

    // --- Query ---
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    // --- Cross-cutting ---
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl StoreError {
    /// Creates a new invalid-document error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Creates a new invalid-id error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a new invalid-configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new save error
    pub fn save_error(msg: impl Into<String>) -> Self {
        Self::SaveError(msg.into())
    }

    /// Creates a new read error
    pub fn read_error(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Creates a new IO error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Creates a new internal error
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    /// Checks if the error indicates a transient condition worth retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::LockError(_) | StoreError::IoError(_))
    }

    /// Checks if the error came from schema validation
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            StoreError::RequiredField(_)
                | StoreError::InvalidType(_)
                | StoreError::InvalidValue(_)
                | StoreError::InvalidLength(_)
                | StoreError::InvalidRegex(_)
                | StoreError::InvalidEnum(_)
                | StoreError::CustomValidation(_)
                | StoreError::InvalidField(_)
        )
    }

    /// Gets the stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotInitialized(_) => "NotInitialized",
            StoreError::InvalidName(_) => "InvalidName",
            StoreError::InitError(_) => "InitError",
            StoreError::LoadError(_) => "LoadError",
            StoreError::CollectionError(_) => "CollectionError",
            StoreError::MetadataError(_) => "MetadataError",
            StoreError::DropError(_) => "DropError",
            StoreError::InvalidDocument(_) => "InvalidDocument",
            StoreError::InvalidId(_) => "InvalidId",
            StoreError::NotFound(_) => "NotFound",
            StoreError::InsertError(_) => "InsertError",
            StoreError::UpdateError(_) => "UpdateError",
            StoreError::InvalidUpdate(_) => "InvalidUpdate",
            StoreError::DeleteError(_) => "DeleteError",
            StoreError::QueryError(_) => "QueryError",
            StoreError::LockError(_) => "LockError",
            StoreError::InvalidPosition(_) => "InvalidPosition",
            StoreError::InvalidType(_) => "InvalidType",
            StoreError::RequiredField(_) => "RequiredField",
            StoreError::InvalidValue(_) => "InvalidValue",
            StoreError::InvalidLength(_) => "InvalidLength",
            StoreError::InvalidRegex(_) => "InvalidRegex",
            StoreError::InvalidEnum(_) => "InvalidEnum",
            StoreError::CustomValidation(_) => "CustomValidationError",
            StoreError::InvalidField(_) => "InvalidField",
            StoreError::SaveError(_) => "SaveError",
            StoreError::ReadError(_) => "ReadError",
            StoreError::CompressError(_) => "CompressError",
            StoreError::DecompressError(_) => "DecompressError",
            StoreError::CreateError(_) => "CreateError",
            StoreError::UniqueViolation(_) => "UniqueViolation",
            StoreError::IndexSaveError(_) => "SaveError",
            StoreError::IndexLoadError(_) => "LoadError",
            StoreError::InvalidFieldType(_) => "InvalidFieldType",
            StoreError::InvalidOperator(_) => "InvalidOperator",
            StoreError::InvalidCriteria(_) => "InvalidCriteria",
            StoreError::InvalidConfiguration(_) => "InvalidConfiguration",
            StoreError::SerializationError(_) => "SerializationError",
            StoreError::IoError(_) => "IoError",
            StoreError::InternalError(_) => "InternalError",
        }
    }

    /// Gets the error category (subsystem grouping)
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::NotInitialized(_)
            | StoreError::InvalidName(_)
            | StoreError::InitError(_)
            | StoreError::LoadError(_)
            | StoreError::CollectionError(_) => "database",
            StoreError::MetadataError(_) | StoreError::DropError(_) => "collection",
            StoreError::InvalidDocument(_)
            | StoreError::InvalidId(_)
            | StoreError::NotFound(_)
            | StoreError::InsertError(_)
            | StoreError::UpdateError(_)
            | StoreError::InvalidUpdate(_)
            | StoreError::DeleteError(_)
            | StoreError::QueryError(_)
            | StoreError::LockError(_)
            | StoreError::InvalidPosition(_) => "document",
            StoreError::InvalidType(_)
            | StoreError::RequiredField(_)
            | StoreError::InvalidValue(_)
            | StoreError::InvalidLength(_)
            | StoreError::InvalidRegex(_)
            | StoreError::InvalidEnum(_)
            | StoreError::CustomValidation(_)
            | StoreError::InvalidField(_) => "schema",
            StoreError::SaveError(_) | StoreError::ReadError(_) => "storage",
            StoreError::CompressError(_) | StoreError::DecompressError(_) => "compression",
            StoreError::CreateError(_)
            | StoreError::UniqueViolation(_)
            | StoreError::IndexSaveError(_)
            | StoreError::IndexLoadError(_)
            | StoreError::InvalidFieldType(_) => "index",
            StoreError::InvalidOperator(_) | StoreError::InvalidCriteria(_) => "query",
            StoreError::InvalidConfiguration(_) => "configuration",
            StoreError::SerializationError(_) => "serialization",
            StoreError::IoError(_) => "io",
            StoreError::InternalError(_) => "internal",
        }
    }
}

// Implement conversion from standard library errors
impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err.to_string())
    }
}
