// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Index Manager
//!
//! Owns every index of every collection: an in-memory registry keyed by
//! `(collection, fieldSpec)`, persisted as one `.idx` JSON file per index
//! under `<collection>/_indices/`, rewritten whole on each change.
//!
//! ## Uniqueness Discipline
//!
//! `update_index` runs in two phases: every unique index of the collection is
//! prechecked against the document's projected keys **before** any index is
//! mutated. A `UniqueViolation` therefore leaves all indexes exactly as they
//! were for that document.
//!
//! ## Sparse Discipline
//!
//! An entry is skipped iff the projected value is absent AND the index is
//! sparse. Non-sparse indexes bucket absent values under the `undefined`
//! rendering; uniqueness is enforced for present values only, so documents
//! missing the field coexist even under a unique index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use docudb_domain::StoreError;

use crate::index::{Index, IndexOptions, FIELD_SPEC_SEPARATOR};

/// Directory under each collection holding `.idx` files.
pub const INDICES_DIR: &str = "_indices";

/// Registry and persistence of all equality indexes.
pub struct IndexManager {
    base_dir: PathBuf,
    /// `(collection, fieldSpec)` -> index
    indices: RwLock<HashMap<(String, String), Index>>,
}

impl IndexManager {
    /// Creates a manager rooted at the database's data directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            indices: RwLock::new(HashMap::new()),
        }
    }

    fn indices_dir(&self, collection: &str) -> PathBuf {
        self.base_dir.join(collection).join(INDICES_DIR)
    }

    fn index_path(&self, collection: &str, field_spec: &str) -> PathBuf {
        self.indices_dir(collection).join(format!("{}.idx", field_spec))
    }

    /// Joins a field list into its registry spec, validating the names.
    fn field_spec_of(fields: &[String]) -> Result<String, StoreError> {
        if fields.is_empty() {
            return Err(StoreError::InvalidFieldType("index needs at least one field".to_string()));
        }
        for field in fields {
            if field.is_empty() || field.contains('/') || field.contains('\\') || field.starts_with('.') {
                return Err(StoreError::InvalidFieldType(format!(
                    "'{}' is not a valid index field name",
                    field
                )));
            }
        }
        Ok(fields.join(&FIELD_SPEC_SEPARATOR.to_string()))
    }

    /// Creates an index. Idempotent: re-creating an existing spec leaves the
    /// stored index untouched and still returns `true`.
    ///
    /// Back-filling over existing documents is the caller's responsibility
    /// (the collection controller replays `update_index` over its documents).
    pub async fn create_index(
        &self,
        collection: &str,
        fields: &[String],
        options: IndexOptions,
    ) -> Result<bool, StoreError> {
        let spec = Self::field_spec_of(fields)?;
        let registry_key = (collection.to_string(), spec.clone());

        let mut indices = self.indices.write().await;
        if indices.contains_key(&registry_key) {
            debug!(collection, spec = %spec, "index already exists");
            return Ok(true);
        }

        let index = Index::new(fields.to_vec(), &options);
        self.persist(collection, &index).await?;
        indices.insert(registry_key, index);
        info!(collection, spec = %spec, unique = options.unique, sparse = options.sparse, "index created");
        Ok(true)
    }

    /// Drops an index: removes the registry entry and deletes its `.idx`
    /// file. Returns whether the index existed.
    pub async fn drop_index(&self, collection: &str, field_spec: &str) -> Result<bool, StoreError> {
        let existed = {
            let mut indices = self.indices.write().await;
            indices.remove(&(collection.to_string(), field_spec.to_string())).is_some()
        };

        let path = self.index_path(collection, field_spec);
        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StoreError::DropError(format!("removing {}: {}", path.display(), e)));
            }
        }

        if existed {
            info!(collection, field_spec, "index dropped");
        }
        Ok(existed)
    }

    /// Re-registers a document's values in every index of the collection.
    ///
    /// Uniqueness is prechecked across all indexes before any mutation, then
    /// prior occurrences of the id are purged, the new keys are appended,
    /// `updated` is bumped, and every index of the collection is persisted.
    pub async fn update_index(&self, collection: &str, doc_id: &str, doc: &Value) -> Result<(), StoreError> {
        let mut indices = self.indices.write().await;

        // Phase 1: uniqueness precheck. No mutation may happen before every
        // unique index has accepted the document.
        for ((coll, spec), index) in indices.iter() {
            if coll != collection || !index.unique {
                continue;
            }
            let (key, absent) = index.project_key(doc);
            if absent {
                continue;
            }
            if let Some(owner) = index.owner_of(&key) {
                if owner != doc_id {
                    return Err(StoreError::UniqueViolation(format!(
                        "index '{}' already maps value key '{}' to document '{}'",
                        spec, key, owner
                    )));
                }
            }
        }

        // Phase 2: apply.
        let now = Utc::now();
        let mut touched = Vec::new();
        for ((coll, _), index) in indices.iter_mut() {
            if coll != collection {
                continue;
            }
            let (key, absent) = index.project_key(doc);
            index.remove_doc(doc_id);
            if !(absent && index.sparse) {
                index.insert_doc(key, doc_id);
            }
            index.updated = now;
            touched.push(index.clone());
        }

        for index in &touched {
            self.persist(collection, index).await?;
        }
        Ok(())
    }

    /// Purges a document id from every index of the collection and persists.
    pub async fn remove_from_indices(&self, collection: &str, doc_id: &str) -> Result<(), StoreError> {
        let mut indices = self.indices.write().await;
        let now = Utc::now();
        let mut touched = Vec::new();
        for ((coll, _), index) in indices.iter_mut() {
            if coll != collection {
                continue;
            }
            index.remove_doc(doc_id);
            index.updated = now;
            touched.push(index.clone());
        }
        for index in &touched {
            self.persist(collection, index).await?;
        }
        Ok(())
    }

    /// Looks up the id bucket for a value on a simple (or compound-spec)
    /// index. `None` means no such index exists; an empty vec means the index
    /// exists but holds no entry for the value.
    pub async fn find_by_index(&self, collection: &str, field_spec: &str, value: &Value) -> Option<Vec<String>> {
        let indices = self.indices.read().await;
        let index = indices.get(&(collection.to_string(), field_spec.to_string()))?;
        let key = Index::lookup_key(value);
        Some(index.entries.get(&key).cloned().unwrap_or_default())
    }

    /// True when the collection has an index for the field spec.
    pub async fn has_index(&self, collection: &str, field_spec: &str) -> bool {
        self.indices
            .read()
            .await
            .contains_key(&(collection.to_string(), field_spec.to_string()))
    }

    /// Snapshot of every index belonging to the collection.
    pub async fn list_indexes(&self, collection: &str) -> Vec<Index> {
        let indices = self.indices.read().await;
        let mut result: Vec<Index> = indices
            .iter()
            .filter(|((coll, _), _)| coll == collection)
            .map(|(_, index)| index.clone())
            .collect();
        result.sort_by(|a, b| a.field_spec().cmp(&b.field_spec()));
        result
    }

    /// Ensures the `_indices/` directory exists and rehydrates every stored
    /// `.idx` file of the collection into the registry.
    pub async fn load_collection_indices(&self, collection: &str) -> Result<(), StoreError> {
        let dir = self.indices_dir(collection);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::InitError(format!("creating {}: {}", dir.display(), e)))?;

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StoreError::IndexLoadError(format!("listing {}: {}", dir.display(), e)))?;

        let mut indices = self.indices.write().await;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::IndexLoadError(format!("listing {}: {}", dir.display(), e)))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "idx") {
                continue;
            }
            let bytes = fs::read(&path)
                .await
                .map_err(|e| StoreError::IndexLoadError(format!("reading {}: {}", path.display(), e)))?;
            let index: Index = serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::IndexLoadError(format!("parsing {}: {}", path.display(), e)))?;
            debug!(collection, spec = %index.field_spec(), "index rehydrated");
            indices.insert((collection.to_string(), index.field_spec()), index);
        }
        Ok(())
    }

    /// Forgets every in-memory index of a collection. Used when the
    /// collection is dropped; the `.idx` files disappear with its directory.
    pub async fn forget_collection(&self, collection: &str) {
        self.indices.write().await.retain(|(coll, _), _| coll != collection);
    }

    /// Rewrites one index file (temporary sibling + rename).
    async fn persist(&self, collection: &str, index: &Index) -> Result<(), StoreError> {
        let dir = self.indices_dir(collection);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::IndexSaveError(format!("creating {}: {}", dir.display(), e)))?;

        let path = self.index_path(collection, &index.field_spec());
        let bytes =
            serde_json::to_vec(index).map_err(|e| StoreError::IndexSaveError(format!("serializing index: {}", e)))?;
        let tmp = path.with_extension("idx.tmp");
        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::IndexSaveError(format!("writing {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::IndexSaveError(format!("renaming {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// The data directory this manager persists under.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
