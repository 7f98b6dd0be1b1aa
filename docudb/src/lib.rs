// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DocuDB
//!
//! An embedded, single-process, document-oriented storage engine. Documents
//! are JSON-like trees persisted as chunked, optionally gzip-compressed files
//! under a local directory; collections carry equality indexes (unique,
//! sparse, compound), optional declarative schemas, and a MongoDB-subset
//! query language with index-assisted execution.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docudb::{Database, DatabaseConfig};
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), docudb::StoreError> {
//! let db = Database::new(DatabaseConfig::new().with_name("inventory"))?;
//! db.initialize().await?;
//!
//! let products = db.collection("products").await?;
//! products.insert_one(json!({"name": "Laptop", "price": 1000, "stock": 5})).await?;
//! let expensive = products.find(json!({"price": {"$gt": 50}})).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The workspace follows a domain / infrastructure split:
//!
//! - [`docudb_domain`] (re-exported as [`domain`]) holds the pure logic:
//!   schema validation, query compilation and matching, value objects, and
//!   the service ports.
//! - This crate provides the infrastructure (gzip codec, chunked file
//!   storage, configuration) and the orchestration layer (index manager,
//!   collection controller, database façade).
//!
//! ## Durability Model
//!
//! Writes are best-effort against the filesystem: individual chunk, index,
//! and metadata files are written via temporary-sibling-plus-rename so no
//! file is observable half-written, but there is no WAL and no cross-file
//! atomicity. Per-document mutations are serialized with advisory locks;
//! metadata read-modify-writes are serialized per collection.

pub mod collection;
pub mod database;
pub mod index;
pub mod infrastructure;

/// The domain layer, re-exported for direct access.
pub use docudb_domain as domain;

// Re-export the surface an embedder touches day to day.
pub use collection::{Collection, CollectionOptions, CollectionStats, IndexInfo};
pub use database::Database;
pub use index::{IndexManager, IndexOptions};
pub use infrastructure::adapters::{FileStorage, GzipCompression};
pub use infrastructure::config::DatabaseConfig;

pub use docudb_domain::value_objects::{is_valid_id, is_valid_mongo_id, is_valid_uuid};
pub use docudb_domain::{
    ChunkSize, DocumentId, FieldDefinition, FieldType, IdKind, Query, Schema, SchemaOptions, SortOrder, StoreError,
    ValidationRules,
};
