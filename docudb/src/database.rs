// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Database Façade
//!
//! Lifecycle and registry for a DocuDB instance: validates the database name
//! against the path-sanitization rules, owns the shared storage and index
//! manager, and hands out `Arc<Collection>` handles.
//!
//! ## Registry Semantics
//!
//! [`Database::collection`] is idempotent: repeated calls for the same name
//! return the same shared handle. Attaching options (a schema, an id format)
//! goes through [`Database::collection_with_options`], which replaces the
//! registered instance; schemas carry closures and therefore cannot be
//! rehydrated from disk, so an embedder re-attaches them after reopening.
//!
//! ## Reopening
//!
//! [`Database::initialize`] creates the data root, then re-opens every
//! subdirectory not starting with `_` as a collection, loading its metadata
//! and stored indexes. Unique constraints are enforced again immediately
//! after a reopen.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;
use tracing::info;

use docudb_domain::services::DocumentStorage;
use docudb_domain::{CollectionName, StoreError};

use crate::collection::{Collection, CollectionOptions};
use crate::index::IndexManager;
use crate::infrastructure::adapters::{FileStorage, GzipCompression};
use crate::infrastructure::config::DatabaseConfig;

/// An embedded document database rooted at `<data_dir>/<name>`.
pub struct Database {
    config: DatabaseConfig,
    root: PathBuf,
    storage: Arc<FileStorage>,
    indexes: Arc<IndexManager>,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
    initialized: AtomicBool,
}

impl Database {
    /// Builds a database from its configuration.
    ///
    /// Validation (name sanitization, chunk-size bounds) happens here, before
    /// any filesystem work.
    pub fn new(config: DatabaseConfig) -> Result<Self, StoreError> {
        let (_, chunk_size) = config.validate()?;
        let root = config.root_path();
        let storage = Arc::new(FileStorage::new(
            &root,
            chunk_size,
            Arc::new(GzipCompression::new()),
            config.compression,
        ));
        let indexes = Arc::new(IndexManager::new(&root));
        Ok(Self {
            config,
            root,
            storage,
            indexes,
            collections: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(false),
        })
    }

    /// Convenience constructor with all defaults.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::new(DatabaseConfig::default())
    }

    /// Creates the data root and re-opens every stored collection.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.storage.init().await?;

        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::InitError(format!("listing {}: {}", self.root.display(), e)))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::InitError(format!("listing {}: {}", self.root.display(), e)))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StoreError::InitError(format!("inspecting {}: {}", entry.path().display(), e)))?;
            if !file_type.is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            if name.starts_with('_') || name.starts_with('.') {
                continue;
            }
            self.open_collection(name, CollectionOptions::default()).await?;
        }

        self.initialized.store(true, Ordering::SeqCst);
        info!(database = %self.config.name, root = %self.root.display(), "database initialized");
        Ok(())
    }

    /// Gets (or lazily creates) a collection with default options.
    /// Idempotent: the same name always yields the same shared handle.
    pub async fn collection(&self, name: &str) -> Result<Arc<Collection>, StoreError> {
        self.require_initialized()?;
        let name = CollectionName::new(name)?;
        if let Some(existing) = self.collections.read().await.get(name.as_str()) {
            return Ok(existing.clone());
        }
        self.open_collection(name.as_str().to_string(), CollectionOptions::default())
            .await
    }

    /// Opens a collection with explicit options, replacing any registered
    /// instance. This is how a schema or id format is (re-)attached,
    /// including after a reopen.
    pub async fn collection_with_options(
        &self,
        name: &str,
        options: CollectionOptions,
    ) -> Result<Arc<Collection>, StoreError> {
        self.require_initialized()?;
        let name = CollectionName::new(name)?;
        self.open_collection(name.as_str().to_string(), options).await
    }

    /// Names of every registered collection, in sorted order.
    pub async fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Drops a collection: documents, indexes, directory, registry entry.
    /// Returns `false` when no such collection exists.
    pub async fn drop_collection(&self, name: &str) -> Result<bool, StoreError> {
        self.require_initialized()?;
        let name = CollectionName::new(name)?;

        let registered = { self.collections.write().await.remove(name.as_str()) };
        match registered {
            Some(collection) => {
                Collection::drop(&collection).await?;
                Ok(true)
            }
            None => {
                // Unregistered but present on disk (never referenced since
                // startup): still remove it.
                let dir = self.root.join(name.as_str());
                if fs::try_exists(&dir)
                    .await
                    .map_err(|e| StoreError::DropError(format!("checking {}: {}", dir.display(), e)))?
                {
                    self.indexes.forget_collection(name.as_str()).await;
                    self.storage.remove_collection_dir(name.as_str()).await?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
        }
    }

    /// Drops every collection and removes the data root. Idempotent when the
    /// root is already gone.
    pub async fn drop(&self) -> Result<(), StoreError> {
        let names = self.list_collections().await;
        for name in names {
            self.drop_collection(&name).await?;
        }
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StoreError::DropError(format!(
                    "removing {}: {}",
                    self.root.display(),
                    e
                )));
            }
        }
        self.initialized.store(false, Ordering::SeqCst);
        info!(database = %self.config.name, "database dropped");
        Ok(())
    }

    /// The database configuration
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// The data root all collections live under
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn require_initialized(&self) -> Result<(), StoreError> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::NotInitialized(format!(
                "database '{}' must be initialized before use",
                self.config.name
            )))
        }
    }

    async fn open_collection(
        &self,
        name: String,
        options: CollectionOptions,
    ) -> Result<Arc<Collection>, StoreError> {
        let collection = Arc::new(Collection::new(
            name.clone(),
            self.storage.clone() as Arc<dyn DocumentStorage>,
            self.indexes.clone(),
            options,
        ));
        collection.initialize().await?;
        self.collections.write().await.insert(name, collection.clone());
        Ok(collection)
    }
}
