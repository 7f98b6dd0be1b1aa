// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Gzip Compression Adapter
//!
//! This module is part of the Infrastructure layer, providing the concrete
//! implementation of the domain's `CompressionService` port.
//!
//! Chunk files use the standard gzip container so on-disk data stays portable
//! across implementations and ordinary tooling (`zcat`, `gunzip`) can inspect
//! it. Each chunk is compressed independently; nothing in this adapter knows
//! about chunk boundaries or documents.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use docudb_domain::services::CompressionService;
use docudb_domain::StoreError;

/// Gzip implementation of the byte-level compression contract.
///
/// Stateless and thread-safe; one instance serves every collection.
#[derive(Debug, Clone)]
pub struct GzipCompression {
    level: Compression,
}

impl GzipCompression {
    /// Creates the adapter at the default compression level (6).
    pub fn new() -> Self {
        Self {
            level: Compression::new(6),
        }
    }

    /// Creates the adapter at an explicit gzip level (0-9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for GzipCompression {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionService for GzipCompression {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, StoreError> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(data)
            .map_err(|e| StoreError::CompressError(format!("gzip encode: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| StoreError::CompressError(format!("gzip finish: {}", e)))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, StoreError> {
        let mut decoder = GzDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| StoreError::DecompressError(format!("gzip decode: {}", e)))?;
        Ok(out)
    }
}
