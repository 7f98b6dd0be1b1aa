// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Compression Service
//!
//! Domain-level contract for the byte-level compression applied to chunk
//! files. The engine fixes a gzip-compatible format so on-disk chunks remain
//! portable across implementations; the concrete codec lives in the
//! infrastructure layer.
//!
//! Both operations are total functions over byte buffers: every input either
//! produces an output buffer or a `CompressError`/`DecompressError`. The
//! round-trip law `decompress(compress(bytes)) == bytes` holds for every
//! byte sequence.
//!
//! # Architecture Note
//!
//! This trait is **synchronous**. The domain defines *what* the operation is,
//! not *how* it is scheduled; callers that need to keep an async runtime
//! responsive wrap calls at the infrastructure layer.

use crate::error::StoreError;

/// Byte-level compression contract for chunk files.
///
/// Implementations must be stateless and thread-safe; the engine shares one
/// instance across every collection.
pub trait CompressionService: Send + Sync {
    /// Compresses a byte buffer.
    ///
    /// # Errors
    ///
    /// `StoreError::CompressError` on any codec failure.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, StoreError>;

    /// Decompresses a byte buffer previously produced by [`compress`].
    ///
    /// # Errors
    ///
    /// `StoreError::DecompressError` on truncated or corrupted input.
    ///
    /// [`compress`]: CompressionService::compress
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, StoreError>;
}
