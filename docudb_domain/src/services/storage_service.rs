// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Storage Port
//!
//! Infrastructure port for chunked document persistence. A document's
//! serialized form lives at the logical path `<collection>/<docId>` as an
//! ordered sequence of chunk files numbered densely from zero; each chunk
//! holds at most the configured chunk size of the payload's JSON
//! serialization and is compressed independently when compression is
//! enabled.
//!
//! The port is async: every operation is a suspension point in the engine's
//! cooperative concurrency model. Implementations must guarantee that a
//! partially failed save raises `SaveError` and never leaves a chunk file
//! half-written (writes are atomic with respect to file contents).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

/// Chunked persistence of JSON payloads at `<collection>/<docId>`.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Prepares the storage root (creates the data directory).
    async fn init(&self) -> Result<(), StoreError>;

    /// Serializes `value` in key-insertion-preserving JSON, splits it into
    /// chunk files, and writes them. Returns the ordered chunk paths.
    ///
    /// # Errors
    ///
    /// `SaveError` on any per-chunk failure; the caller treats the document
    /// as undefined and recovers from its own metadata.
    async fn save_data(&self, collection: &str, doc_id: &str, value: &Value) -> Result<Vec<PathBuf>, StoreError>;

    /// Reads chunk files in the given order, decompressing per chunk where
    /// applicable, and parses the concatenated bytes as JSON.
    ///
    /// Storage returns raw JSON-native values only; date revival is the
    /// schema validator's concern.
    async fn read_data(&self, chunk_paths: &[PathBuf]) -> Result<Value, StoreError>;

    /// Removes chunk files. Idempotent: missing files are not an error.
    async fn delete_chunks(&self, chunk_paths: &[PathBuf]) -> Result<(), StoreError>;

    /// Lists a document's chunk files ordered by their numeric suffix.
    /// A missing document directory yields an empty list.
    async fn list_chunks(&self, collection: &str, doc_id: &str) -> Result<Vec<PathBuf>, StoreError>;

    /// Removes a document's directory. Idempotent.
    async fn remove_document_dir(&self, collection: &str, doc_id: &str) -> Result<(), StoreError>;

    /// Removes a collection's directory tree. Idempotent.
    async fn remove_collection_dir(&self, collection: &str) -> Result<(), StoreError>;

    /// The storage root all collection directories live under.
    fn base_dir(&self) -> &Path;
}
