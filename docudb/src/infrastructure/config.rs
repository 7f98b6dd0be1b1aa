// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Database Configuration
//!
//! Typed configuration for a DocuDB instance. Embedders normally build it in
//! code with the `with_*` methods; deployments that keep engine settings in a
//! file can load the same structure from TOML.
//!
//! | Option        | Effect                                          | Default      |
//! |---------------|--------------------------------------------------|-------------|
//! | `name`        | data root directory name (path-sanitized)        | `"docudb"`  |
//! | `data_dir`    | parent directory for the data root               | current dir |
//! | `chunk_size`  | max bytes per chunk before compression           | 1 MiB       |
//! | `compression` | gzip each chunk                                  | `true`      |
//! | `id_type`     | generated identifier format (`mongo` / `uuid`)   | `"mongo"`   |
//!
//! Validation happens at construction time ([`DatabaseConfig::validate`] runs
//! inside `Database::new`), so a bad name or chunk size surfaces before any
//! filesystem work.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use docudb_domain::{ChunkSize, DatabaseName, IdKind, StoreError};

/// Configuration for one database instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Data root directory name; must pass path sanitization
    pub name: String,
    /// Parent directory the data root is created under
    pub data_dir: PathBuf,
    /// Maximum bytes of serialized payload per chunk file
    pub chunk_size: usize,
    /// Compress each chunk with gzip
    pub compression: bool,
    /// Identifier format for generated `_id`s
    pub id_type: IdKind,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "docudb".to_string(),
            data_dir: PathBuf::from("."),
            chunk_size: ChunkSize::DEFAULT_SIZE,
            compression: true,
            id_type: IdKind::Mongo,
        }
    }
}

impl DatabaseConfig {
    /// Creates the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the data root directory name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the parent directory for the data root
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the chunk size in bytes
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Enables or disables per-chunk compression
    pub fn with_compression(mut self, compression: bool) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the generated identifier format
    pub fn with_id_type(mut self, id_type: IdKind) -> Self {
        self.id_type = id_type;
        self
    }

    /// Loads a configuration from TOML text; unspecified keys keep their
    /// defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, StoreError> {
        toml::from_str(text).map_err(|e| StoreError::InvalidConfiguration(format!("parsing config: {}", e)))
    }

    /// Loads a configuration from a TOML file.
    pub async fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::InvalidConfiguration(format!("reading {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Validates the configuration, returning the parsed pieces the engine
    /// needs.
    pub fn validate(&self) -> Result<(DatabaseName, ChunkSize), StoreError> {
        let name = DatabaseName::new(self.name.clone())?;
        let chunk_size = ChunkSize::new(self.chunk_size)?;
        Ok((name, chunk_size))
    }

    /// The data root all collections live under: `<data_dir>/<name>`.
    pub fn root_path(&self) -> PathBuf {
        self.data_dir.join(&self.name)
    }
}
