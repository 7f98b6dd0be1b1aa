// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DocuDB Domain
//!
//! The domain layer of the DocuDB embedded document store: the business rules
//! of document storage, independent of filesystems, runtimes, and codecs. It
//! follows Domain-Driven Design patterns and contains no I/O.
//!
//! ## Module Structure
//!
//! ### Value Objects
//! Immutable, self-validating values with no identity:
//!
//! - `ChunkSize`: validated byte bound for chunk files
//! - `DocumentId` / `IdKind`: generated and validated identifiers (24-hex
//!   MongoDB-style or UUIDv4)
//! - `DatabaseName` / `CollectionName`: path-sanitized directory names
//! - `FieldPath`: dot-notation addressing into document trees
//!
//! ### Document Semantics
//! Deep equality, native ordering, date interpretation, and index key
//! normalization over JSON document values. `null` and absent stay distinct
//! everywhere.
//!
//! ### Schema
//! Declarative validation and normalization: typed fields, requiredness,
//! static and computed defaults, constraint rules (bounds, lengths, patterns,
//! enums, custom validators), transforms, strict mode, and timestamp
//! maintenance.
//!
//! ### Query
//! A MongoDB-subset filter language compiled once into an AST and evaluated
//! as a pure function per document, with sort/skip/limit/projection
//! execution.
//!
//! ### Services
//! Contracts implemented by the infrastructure layer: the synchronous
//! byte-level `CompressionService` and the async `DocumentStorage` port for
//! chunked persistence.
//!
//! ## Error Handling
//!
//! Every fallible operation returns `Result<_, StoreError>`; each variant
//! carries a stable machine-readable code (`StoreError::code`) and a
//! subsystem category (`StoreError::category`).

pub mod document;
pub mod error;
pub mod query;
pub mod schema;
pub mod services;
pub mod value_objects;

// Re-export commonly used types for convenient access
// These exports provide a clean API surface for consumers of the domain layer
pub use error::StoreError;
pub use query::{Query, SortOrder};
pub use schema::{FieldDefinition, FieldType, Schema, SchemaOptions, ValidationRules};
pub use value_objects::{ChunkSize, CollectionName, DatabaseName, DocumentId, FieldPath, IdKind};
