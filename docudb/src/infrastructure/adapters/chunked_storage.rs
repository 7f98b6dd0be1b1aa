// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunked File Storage
//!
//! This module is part of the Infrastructure layer, providing the concrete
//! implementation of the domain's `DocumentStorage` port on top of the local
//! filesystem.
//!
//! ## On-Disk Layout
//!
//! ```text
//! <base>/<collection>/<docId>/chunk_0.<ext>
//!                             chunk_1.<ext>
//!                             ...
//! ```
//!
//! The document's JSON serialization (key-insertion-preserving) is split
//! into fixed-size slices of at most the configured chunk size; each slice
//! becomes one file, compressed independently when compression is enabled
//! (`.gz`), plain otherwise (`.json`). Chunk numbering is dense from zero.
//!
//! ## Write Discipline
//!
//! Each chunk is written to a temporary sibling and renamed into place, so a
//! chunk file is never observable half-written. There is no cross-chunk
//! rollback: a failed save surfaces `SaveError` and the caller recovers from
//! its metadata.
//!
//! ## Reading
//!
//! Decompression is decided per file by extension, not by the current
//! configuration, so a store reopened with compression disabled still reads
//! its older `.gz` chunks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use docudb_domain::services::{CompressionService, DocumentStorage};
use docudb_domain::{ChunkSize, StoreError};

/// Filesystem implementation of the chunked storage port.
pub struct FileStorage {
    base_dir: PathBuf,
    chunk_size: ChunkSize,
    codec: Arc<dyn CompressionService>,
    compress_writes: bool,
}

impl FileStorage {
    /// Creates a storage handle rooted at `base_dir`.
    ///
    /// The codec is always available for reads; `compress_writes` decides
    /// whether new chunks are written compressed.
    pub fn new(
        base_dir: impl Into<PathBuf>,
        chunk_size: ChunkSize,
        codec: Arc<dyn CompressionService>,
        compress_writes: bool,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            chunk_size,
            codec,
            compress_writes,
        }
    }

    /// Gets the configured chunk size
    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    fn document_dir(&self, collection: &str, doc_id: &str) -> PathBuf {
        self.base_dir.join(collection).join(doc_id)
    }

    fn extension(&self) -> &'static str {
        if self.compress_writes {
            "gz"
        } else {
            "json"
        }
    }

    /// Writes `bytes` to `path` via a temporary sibling and rename, so the
    /// final file is atomic with respect to its contents.
    async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)
            .await
            .map_err(|e| StoreError::SaveError(format!("writing {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::SaveError(format!("renaming {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Parses the dense numeric suffix out of `chunk_<n>.<ext>`.
    fn chunk_index(file_name: &str) -> Option<u64> {
        let rest = file_name.strip_prefix("chunk_")?;
        let digits = rest.strip_suffix(".json").or_else(|| rest.strip_suffix(".gz"))?;
        digits.parse().ok()
    }
}

#[async_trait]
impl DocumentStorage for FileStorage {
    async fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StoreError::InitError(format!("creating {}: {}", self.base_dir.display(), e)))?;
        debug!(base = %self.base_dir.display(), "storage initialized");
        Ok(())
    }

    async fn save_data(&self, collection: &str, doc_id: &str, value: &Value) -> Result<Vec<PathBuf>, StoreError> {
        let payload =
            serde_json::to_vec(value).map_err(|e| StoreError::SaveError(format!("serializing {}: {}", doc_id, e)))?;

        let dir = self.document_dir(collection, doc_id);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::SaveError(format!("creating {}: {}", dir.display(), e)))?;

        let mut paths = Vec::with_capacity(payload.len().div_ceil(self.chunk_size.bytes()));
        for (index, slice) in payload.chunks(self.chunk_size.bytes()).enumerate() {
            let path = dir.join(format!("chunk_{}.{}", index, self.extension()));
            let bytes = if self.compress_writes {
                self.codec.compress(slice)?
            } else {
                slice.to_vec()
            };
            Self::write_atomic(&path, &bytes).await?;
            paths.push(path);
        }

        debug!(
            collection,
            doc_id,
            chunks = paths.len(),
            bytes = payload.len(),
            "document chunks written"
        );
        Ok(paths)
    }

    async fn read_data(&self, chunk_paths: &[PathBuf]) -> Result<Value, StoreError> {
        let mut payload = Vec::new();
        for path in chunk_paths {
            let bytes = fs::read(path)
                .await
                .map_err(|e| StoreError::ReadError(format!("reading {}: {}", path.display(), e)))?;
            let bytes = if path.extension().is_some_and(|ext| ext == "gz") {
                self.codec.decompress(&bytes)?
            } else {
                bytes
            };
            payload.extend_from_slice(&bytes);
        }

        serde_json::from_slice(&payload).map_err(|e| StoreError::ReadError(format!("parsing document: {}", e)))
    }

    async fn delete_chunks(&self, chunk_paths: &[PathBuf]) -> Result<(), StoreError> {
        for path in chunk_paths {
            match fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "chunk already gone during delete");
                }
                Err(e) => {
                    return Err(StoreError::DeleteError(format!("removing {}: {}", path.display(), e)));
                }
            }
        }
        Ok(())
    }

    async fn list_chunks(&self, collection: &str, doc_id: &str) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.document_dir(collection, doc_id);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::ReadError(format!("listing {}: {}", dir.display(), e)));
            }
        };

        let mut indexed = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::ReadError(format!("listing {}: {}", dir.display(), e)))?
        {
            let name = entry.file_name();
            if let Some(index) = name.to_str().and_then(Self::chunk_index) {
                indexed.push((index, entry.path()));
            }
        }

        // Order by the numeric suffix, not lexicographically, so chunk_10
        // follows chunk_9.
        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, path)| path).collect())
    }

    async fn remove_document_dir(&self, collection: &str, doc_id: &str) -> Result<(), StoreError> {
        let dir = self.document_dir(collection, doc_id);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteError(format!("removing {}: {}", dir.display(), e))),
        }
    }

    async fn remove_collection_dir(&self, collection: &str) -> Result<(), StoreError> {
        let dir = self.base_dir.join(collection);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::DeleteError(format!("removing {}: {}", dir.display(), e))),
        }
    }

    fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
