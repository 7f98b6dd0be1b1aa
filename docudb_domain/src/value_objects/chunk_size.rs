// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunk Size Value Object
//!
//! Validated size bound for the byte segments a serialized document is split
//! into before persistence. Every chunk file on disk holds at most this many
//! bytes of the document's JSON serialization (compression, when enabled, is
//! applied after slicing, so compressed files may be smaller).
//!
//! ## Constraints
//!
//! - **Minimum Size**: 1 byte (a zero-size chunk cannot make progress)
//! - **Maximum Size**: 64MB (bounds single-file size and read buffers)
//! - **Default Size**: 1MB
//!
//! The value is immutable once constructed and serializes as a plain byte
//! count, so it round-trips through configuration files unchanged.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Maximum number of bytes of serialized payload per chunk file.
///
/// Construction validates the bound, so any `ChunkSize` held by the engine is
/// known to be usable for slicing without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkSize {
    bytes: usize,
}

impl ChunkSize {
    /// Minimum chunk size (1 byte)
    pub const MIN_SIZE: usize = 1;

    /// Maximum chunk size (64MB) - bounds individual chunk files
    pub const MAX_SIZE: usize = 64 * 1024 * 1024;

    /// Default chunk size (1MB)
    pub const DEFAULT_SIZE: usize = 1024 * 1024;

    /// Creates a new chunk size with validation
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidConfiguration` if the size is below
    /// `MIN_SIZE` or above `MAX_SIZE`.
    pub fn new(bytes: usize) -> Result<Self, StoreError> {
        if bytes < Self::MIN_SIZE {
            return Err(StoreError::InvalidConfiguration(format!(
                "Chunk size {} is below minimum of {} bytes",
                bytes,
                Self::MIN_SIZE
            )));
        }

        if bytes > Self::MAX_SIZE {
            return Err(StoreError::InvalidConfiguration(format!(
                "Chunk size {} exceeds maximum of {} bytes",
                bytes,
                Self::MAX_SIZE
            )));
        }

        Ok(ChunkSize { bytes })
    }

    /// Creates a chunk size from kilobytes
    pub fn from_kb(kb: usize) -> Result<Self, StoreError> {
        Self::new(kb * 1024)
    }

    /// Creates a chunk size from megabytes
    pub fn from_mb(mb: usize) -> Result<Self, StoreError> {
        Self::new(mb * 1024 * 1024)
    }

    /// Gets the chunk size in bytes
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Calculates the number of chunk files needed for a payload of the given
    /// byte length
    pub fn chunks_needed(&self, payload_len: usize) -> usize {
        if payload_len == 0 {
            // An empty payload still produces one (empty) chunk so the
            // document directory is never ambiguous with a deleted document.
            return 1;
        }
        payload_len.div_ceil(self.bytes)
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize {
            bytes: Self::DEFAULT_SIZE,
        }
    }
}

impl std::fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.bytes >= 1024 * 1024 {
            write!(f, "{:.1}MB", (self.bytes as f64) / (1024.0 * 1024.0))
        } else if self.bytes >= 1024 {
            write!(f, "{:.1}KB", (self.bytes as f64) / 1024.0)
        } else {
            write!(f, "{}B", self.bytes)
        }
    }
}
