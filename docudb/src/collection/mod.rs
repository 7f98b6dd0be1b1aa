// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Collection Controller
//!
//! Orchestrates CRUD over one named collection: schema validation, identifier
//! generation, index maintenance, chunked persistence, the in-memory document
//! cache, and the persisted metadata (count, index list, stable document
//! order).
//!
//! ## Ordering Guarantees
//!
//! - `insert_one`: index update happens **before** chunk persistence, so a
//!   uniqueness violation never produces orphaned chunks; the metadata write
//!   happens after.
//! - `update_by_id`: under the held per-document lock, chunk write precedes
//!   stale-chunk deletion precedes metadata write precedes index update.
//! - Metadata read-modify-writes are serialized through one async mutex per
//!   collection, so concurrent mutations cannot lose `count` or
//!   `document_order` updates.
//!
//! ## Locking
//!
//! Mutating a document takes an advisory per-document lock keyed by its id:
//! try-lock with up to 10 attempts and a jittered 50 ms backoff, then
//! `LockError`. Updates hold it across read-modify-write; inserts hold it
//! for the resolved id from the duplicate-id check through the metadata
//! append, so two inserts of the same explicit id serialize and the loser
//! fails the check. Reads never take the lock; they observe pre- or
//! post-update state but never torn state, because writes land in a fresh
//! chunk set before the cache entry is swapped.

pub mod metadata;
pub mod update;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde_json::Value;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};

use docudb_domain::document::require_object;
use docudb_domain::services::DocumentStorage;
use docudb_domain::value_objects::is_valid_id;
use docudb_domain::{DocumentId, IdKind, Query, Schema, StoreError};

use crate::index::{IndexManager, IndexOptions, FIELD_SPEC_SEPARATOR};
use metadata::{CollectionMetadata, METADATA_FILE};
use update::apply_update;

const LOCK_ATTEMPTS: u32 = 10;
const LOCK_BACKOFF_MS: u64 = 50;

/// Per-collection options fixed at open time.
#[derive(Clone, Default)]
pub struct CollectionOptions {
    /// Identifier format for generated `_id`s
    pub id_type: IdKind,
    /// Optional schema; validation runs on insert and after updates
    pub schema: Option<Arc<Schema>>,
    /// Maintain `_createdAt`/`_updatedAt` on schemaless collections. With a
    /// schema present, the schema's own `timestamps` option governs.
    pub timestamps: bool,
}

impl CollectionOptions {
    /// Creates default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the generated identifier format
    pub fn with_id_type(mut self, id_type: IdKind) -> Self {
        self.id_type = id_type;
        self
    }

    /// Attaches a schema
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    /// Enables timestamp maintenance
    pub fn with_timestamps(mut self, timestamps: bool) -> Self {
        self.timestamps = timestamps;
        self
    }
}

/// Index description returned by [`Collection::list_indexes`].
#[derive(Debug, Clone)]
pub struct IndexInfo {
    pub field: String,
    pub unique: bool,
    pub sparse: bool,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Snapshot counters returned by [`Collection::stats`].
#[derive(Debug, Clone)]
pub struct CollectionStats {
    pub count: u64,
    pub indexes: usize,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

struct CachedDocument {
    chunk_paths: Vec<PathBuf>,
    data: Value,
}

/// A named set of documents sharing a directory, optional schema, and
/// indexes.
pub struct Collection {
    name: String,
    storage: Arc<dyn DocumentStorage>,
    indexes: Arc<IndexManager>,
    options: CollectionOptions,
    documents: RwLock<HashMap<String, CachedDocument>>,
    /// Single writer for metadata: every read-modify-write holds this across
    /// the file rewrite.
    metadata: Mutex<CollectionMetadata>,
    doc_locks: parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Collection {
    pub(crate) fn new(
        name: String,
        storage: Arc<dyn DocumentStorage>,
        indexes: Arc<IndexManager>,
        options: CollectionOptions,
    ) -> Self {
        Self {
            name,
            storage,
            indexes,
            options,
            documents: RwLock::new(HashMap::new()),
            metadata: Mutex::new(CollectionMetadata::new()),
            doc_locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    /// The collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prepares the collection: directory, metadata record, stored indexes.
    pub(crate) async fn initialize(&self) -> Result<(), StoreError> {
        let dir = self.storage.base_dir().join(&self.name);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::InitError(format!("creating {}: {}", dir.display(), e)))?;

        let metadata_path = dir.join(METADATA_FILE);
        match fs::read(&metadata_path).await {
            Ok(bytes) => {
                let loaded: CollectionMetadata = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::MetadataError(format!("parsing {}: {}", metadata_path.display(), e)))?;
                *self.metadata.lock().await = loaded;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let meta = self.metadata.lock().await;
                self.save_metadata(&meta).await?;
            }
            Err(e) => {
                return Err(StoreError::MetadataError(format!(
                    "reading {}: {}",
                    metadata_path.display(),
                    e
                )));
            }
        }

        self.indexes.load_collection_indices(&self.name).await?;
        info!(collection = %self.name, "collection initialized");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inserts
    // ------------------------------------------------------------------

    /// Validates, persists, and registers one document. Returns the stored
    /// version (defaults applied, identifier generated).
    pub async fn insert_one(&self, doc: Value) -> Result<Value, StoreError> {
        let mut validated = match &self.options.schema {
            Some(schema) => schema.validate(&doc)?,
            None => {
                require_object(&doc)?;
                doc
            }
        };
        if self.options.timestamps && self.options.schema.is_none() {
            stamp_timestamps(&mut validated);
        }

        let id = self.resolve_insert_id(&mut validated)?;

        // One in-flight mutator per id, held from the duplicate check through
        // the metadata append: a racing insert of the same explicit id cannot
        // pass the check before this one registers in the document order.
        let _guard = self.acquire_doc_lock(&id).await?;

        {
            let meta = self.metadata.lock().await;
            if meta.document_order.iter().any(|existing| existing == &id) {
                return Err(StoreError::InsertError(format!(
                    "document '{}' already exists in collection '{}'",
                    id, self.name
                )));
            }
        }

        // Index first: a uniqueness violation must not leave chunks behind.
        self.indexes.update_index(&self.name, &id, &validated).await?;
        let chunk_paths = self.storage.save_data(&self.name, &id, &validated).await?;

        self.documents.write().await.insert(
            id.clone(),
            CachedDocument {
                chunk_paths,
                data: validated.clone(),
            },
        );

        {
            let mut meta = self.metadata.lock().await;
            meta.count += 1;
            meta.document_order.push(id.clone());
            meta.updated = Utc::now();
            self.save_metadata(&meta).await?;
        }

        debug!(collection = %self.name, id = %id, "document inserted");
        Ok(validated)
    }

    /// Sequential inserts. On the first failure, already-inserted documents
    /// remain; the error carries the failing position and the original
    /// error.
    pub async fn insert_many(&self, docs: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let mut inserted = Vec::with_capacity(docs.len());
        for (position, doc) in docs.into_iter().enumerate() {
            match self.insert_one(doc).await {
                Ok(stored) => inserted.push(stored),
                Err(e) => {
                    return Err(StoreError::InsertError(format!(
                        "insert_many stopped at document {}: {}",
                        position, e
                    )));
                }
            }
        }
        Ok(inserted)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Loads a document by id: cache first, then its chunk files. A missing
    /// document directory yields `None`.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Value>, StoreError> {
        self.check_id(id)?;

        if let Some(cached) = self.documents.read().await.get(id) {
            return Ok(Some(cached.data.clone()));
        }

        let chunk_paths = self.storage.list_chunks(&self.name, id).await?;
        if chunk_paths.is_empty() {
            return Ok(None);
        }

        let data = self.storage.read_data(&chunk_paths).await?;
        self.documents.write().await.insert(
            id.to_string(),
            CachedDocument {
                chunk_paths,
                data: data.clone(),
            },
        );
        Ok(Some(data))
    }

    /// Runs a criteria document, index-assisted where possible.
    pub async fn find(&self, criteria: Value) -> Result<Vec<Value>, StoreError> {
        let query = Query::new(criteria)?;
        self.query(&query).await
    }

    /// First match or `None`.
    pub async fn find_one(&self, criteria: Value) -> Result<Option<Value>, StoreError> {
        Ok(self.find(criteria).await?.into_iter().next())
    }

    /// Runs a prepared query (criteria plus sort/skip/limit/projection).
    ///
    /// Before scanning, each top-level `field: scalar` equality pair is
    /// checked against the collection's indexes; the first indexed pair with
    /// candidates serves the query, with every candidate rechecked against
    /// the full criteria. Otherwise every document is loaded in stable order
    /// and filtered.
    pub async fn query(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let lookups: Vec<(String, Value)> = query
            .equality_lookups()
            .into_iter()
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect();

        for (field, value) in lookups {
            if !self.indexes.has_index(&self.name, &field).await {
                continue;
            }
            let Some(ids) = self.indexes.find_by_index(&self.name, &field, &value).await else {
                continue;
            };
            if ids.is_empty() {
                // An empty bucket falls back to the full scan
                continue;
            }
            debug!(collection = %self.name, field = %field, candidates = ids.len(), "index-assisted query");
            let mut matched = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(doc) = self.find_by_id(&id).await? {
                    if query.matches(&doc) {
                        matched.push(doc);
                    }
                }
            }
            return Ok(query.post_process(matched));
        }

        let docs = self.load_all_documents().await?;
        Ok(query.execute(docs))
    }

    /// Counts documents. Empty criteria read the metadata counter directly.
    pub async fn count(&self, criteria: Value) -> Result<u64, StoreError> {
        let empty = criteria.as_object().is_some_and(|map| map.is_empty());
        if empty {
            return Ok(self.metadata.lock().await.count);
        }
        Ok(self.find(criteria).await?.len() as u64)
    }

    // ------------------------------------------------------------------
    // Updates
    // ------------------------------------------------------------------

    /// Applies update operators (or the replacement shorthand) to one
    /// document under its per-document lock. Returns the new version, or
    /// `None` when the id does not exist.
    pub async fn update_by_id(&self, id: &str, update: Value) -> Result<Option<Value>, StoreError> {
        self.check_id(id)?;

        // The lock covers the read-modify phase too, so two racing updates
        // cannot both derive their new version from the same base document.
        let _guard = self.acquire_doc_lock(id).await?;

        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut updated_doc = apply_update(&current, &update)?;
        // Constraints apply to the post-update document as well.
        if let Some(schema) = &self.options.schema {
            updated_doc = schema.validate(&updated_doc)?;
        } else if self.options.timestamps {
            stamp_timestamps(&mut updated_doc);
        }

        let old_paths = self
            .documents
            .read()
            .await
            .get(id)
            .map(|cached| cached.chunk_paths.clone())
            .unwrap_or_default();

        let new_paths = self.storage.save_data(&self.name, id, &updated_doc).await?;

        // A shrinking document leaves higher-numbered chunks behind; drop
        // every old path the new write did not reuse.
        let stale: Vec<PathBuf> = old_paths.into_iter().filter(|p| !new_paths.contains(p)).collect();
        if !stale.is_empty() {
            self.storage.delete_chunks(&stale).await?;
        }

        self.documents.write().await.insert(
            id.to_string(),
            CachedDocument {
                chunk_paths: new_paths,
                data: updated_doc.clone(),
            },
        );

        {
            let mut meta = self.metadata.lock().await;
            meta.updated = Utc::now();
            self.save_metadata(&meta).await?;
        }

        self.indexes.update_index(&self.name, id, &updated_doc).await?;

        debug!(collection = %self.name, id, "document updated");
        Ok(Some(updated_doc))
    }

    /// Updates every matching document sequentially; returns how many were
    /// updated.
    pub async fn update_many(&self, criteria: Value, update: Value) -> Result<u64, StoreError> {
        let matches = self.find(criteria).await?;
        let mut updated = 0;
        for doc in matches {
            let Some(id) = doc.get("_id").and_then(Value::as_str) else {
                continue;
            };
            if self.update_by_id(id, update.clone()).await?.is_some() {
                updated += 1;
            }
        }
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Deletes
    // ------------------------------------------------------------------

    /// Removes one document: chunks, directory, index entries, cache entry,
    /// and metadata. Returns whether the document existed.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        self.check_id(id)?;
        if self.find_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let chunk_paths = self
            .documents
            .read()
            .await
            .get(id)
            .map(|cached| cached.chunk_paths.clone())
            .unwrap_or_default();

        self.storage.delete_chunks(&chunk_paths).await?;
        self.storage.remove_document_dir(&self.name, id).await?;
        self.indexes.remove_from_indices(&self.name, id).await?;
        self.documents.write().await.remove(id);

        {
            let mut meta = self.metadata.lock().await;
            meta.count = meta.count.saturating_sub(1);
            meta.document_order.retain(|existing| existing != id);
            meta.updated = Utc::now();
            self.save_metadata(&meta).await?;
        }

        debug!(collection = %self.name, id, "document deleted");
        Ok(true)
    }

    /// Deletes the first match; returns whether anything was deleted.
    pub async fn delete_one(&self, criteria: Value) -> Result<bool, StoreError> {
        match self.find_one(criteria).await? {
            Some(doc) => match doc.get("_id").and_then(Value::as_str) {
                Some(id) => self.delete_by_id(id).await,
                None => Ok(false),
            },
            None => Ok(false),
        }
    }

    /// Deletes every match sequentially; returns how many were deleted.
    pub async fn delete_many(&self, criteria: Value) -> Result<u64, StoreError> {
        let matches = self.find(criteria).await?;
        let mut deleted = 0;
        for doc in matches {
            if let Some(id) = doc.get("_id").and_then(Value::as_str) {
                if self.delete_by_id(id).await? {
                    deleted += 1;
                }
            }
        }
        Ok(deleted)
    }

    // ------------------------------------------------------------------
    // Indexes
    // ------------------------------------------------------------------

    /// Creates an index (idempotent) and back-fills it over every existing
    /// document. A uniqueness violation among existing documents aborts the
    /// back-fill and surfaces unchanged so callers can branch on it.
    pub async fn create_index(&self, fields: &[&str], options: IndexOptions) -> Result<bool, StoreError> {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        self.indexes.create_index(&self.name, &fields, options).await?;
        let spec = fields.join(&FIELD_SPEC_SEPARATOR.to_string());

        let order = { self.metadata.lock().await.document_order.clone() };
        for id in order {
            if let Some(doc) = self.find_by_id(&id).await? {
                self.indexes.update_index(&self.name, &id, &doc).await?;
            }
        }

        {
            let mut meta = self.metadata.lock().await;
            if !meta.indices.iter().any(|existing| existing == &spec) {
                meta.indices.push(spec);
                meta.updated = Utc::now();
                self.save_metadata(&meta).await?;
            }
        }
        Ok(true)
    }

    /// Drops an index and removes it from the metadata.
    pub async fn drop_index(&self, field_spec: &str) -> Result<bool, StoreError> {
        let existed = self.indexes.drop_index(&self.name, field_spec).await?;
        {
            let mut meta = self.metadata.lock().await;
            let before = meta.indices.len();
            meta.indices.retain(|existing| existing != field_spec);
            if meta.indices.len() != before {
                meta.updated = Utc::now();
                self.save_metadata(&meta).await?;
            }
        }
        Ok(existed)
    }

    /// Describes every index of this collection.
    pub async fn list_indexes(&self) -> Vec<IndexInfo> {
        self.indexes
            .list_indexes(&self.name)
            .await
            .into_iter()
            .map(|index| IndexInfo {
                field: index.field_spec(),
                unique: index.unique,
                sparse: index.sparse,
                name: index.name.clone(),
                created: index.created,
                updated: index.updated,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Document order
    // ------------------------------------------------------------------

    /// Position of a document in the stable order, `-1` when absent.
    pub async fn get_position(&self, id: &str) -> Result<i64, StoreError> {
        self.check_id(id)?;
        Ok(self.metadata.lock().await.position_of(id))
    }

    /// Document at a position in the stable order.
    pub async fn find_by_position(&self, position: i64) -> Result<Option<Value>, StoreError> {
        if position < 0 {
            return Err(StoreError::InvalidPosition(format!(
                "position {} is negative",
                position
            )));
        }
        let id = {
            let meta = self.metadata.lock().await;
            meta.document_order.get(position as usize).cloned()
        };
        match id {
            Some(id) => self.find_by_id(&id).await,
            None => Ok(None),
        }
    }

    /// Moves a document to a new position; positions at or past the end
    /// clamp to the last slot. The cache is invalidated and rehydrated so
    /// enumeration and cache state agree.
    pub async fn update_position(&self, id: &str, new_position: i64) -> Result<(), StoreError> {
        self.check_id(id)?;
        if new_position < 0 {
            return Err(StoreError::InvalidPosition(format!(
                "position {} is negative",
                new_position
            )));
        }

        let order = {
            let mut meta = self.metadata.lock().await;
            let current = meta.position_of(id);
            if current < 0 {
                return Err(StoreError::NotFound(format!(
                    "document '{}' is not in collection '{}'",
                    id, self.name
                )));
            }
            let last = meta.document_order.len() - 1;
            let target = (new_position as usize).min(last);
            if target == current as usize {
                return Ok(());
            }
            let entry = meta.document_order.remove(current as usize);
            meta.document_order.insert(target, entry);
            meta.updated = Utc::now();
            self.save_metadata(&meta).await?;
            meta.document_order.clone()
        };

        self.documents.write().await.clear();
        for id in order {
            self.find_by_id(&id).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection and lifecycle
    // ------------------------------------------------------------------

    /// Snapshot of the persisted metadata.
    pub async fn metadata(&self) -> CollectionMetadata {
        self.metadata.lock().await.clone()
    }

    /// Cheap counters from metadata; touches no document files.
    pub async fn stats(&self) -> CollectionStats {
        let meta = self.metadata.lock().await;
        CollectionStats {
            count: meta.count,
            indexes: meta.indices.len(),
            created: meta.created,
            updated: meta.updated,
        }
    }

    /// Deletes every document, forgets the indexes, and removes the
    /// collection directory.
    pub async fn drop(&self) -> Result<(), StoreError> {
        let order = { self.metadata.lock().await.document_order.clone() };
        for id in &order {
            self.storage.remove_document_dir(&self.name, id).await?;
        }
        self.indexes.forget_collection(&self.name).await;
        self.storage.remove_collection_dir(&self.name).await?;
        self.documents.write().await.clear();
        info!(collection = %self.name, documents = order.len(), "collection dropped");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Identifier rule shared by every id-taking method: a schema owning
    /// `_id` validation replaces the built-in format check.
    fn check_id(&self, id: &str) -> Result<(), StoreError> {
        if let Some(schema) = &self.options.schema {
            if schema.owns_id_validation() {
                return Ok(());
            }
        }
        if is_valid_id(id) {
            Ok(())
        } else {
            Err(StoreError::InvalidId(format!(
                "'{}' is not a valid document identifier",
                id
            )))
        }
    }

    /// Extracts or generates the `_id` for an insert.
    fn resolve_insert_id(&self, validated: &mut Value) -> Result<String, StoreError> {
        match validated.get("_id") {
            Some(Value::String(s)) => {
                let id = s.clone();
                self.check_id(&id)?;
                Ok(id)
            }
            Some(_) => Err(StoreError::InvalidId("_id must be a string".to_string())),
            None => {
                let kind = self
                    .options
                    .schema
                    .as_ref()
                    .and_then(|schema| schema.options().id_type)
                    .unwrap_or(self.options.id_type);
                let id = DocumentId::generate(kind).into_string();
                validated
                    .as_object_mut()
                    .expect("validated document is a map")
                    .insert("_id".to_string(), Value::String(id.clone()));
                Ok(id)
            }
        }
    }

    /// Loads every document in stable order.
    async fn load_all_documents(&self) -> Result<Vec<Value>, StoreError> {
        let order = { self.metadata.lock().await.document_order.clone() };
        let mut docs = Vec::with_capacity(order.len());
        for id in order {
            match self.find_by_id(&id).await? {
                Some(doc) => docs.push(doc),
                None => warn!(collection = %self.name, id = %id, "ordered document missing on disk"),
            }
        }
        Ok(docs)
    }

    /// Rewrites `_metadata.json` (temporary sibling + rename). Callers hold
    /// the metadata mutex, so there is exactly one writer.
    async fn save_metadata(&self, meta: &CollectionMetadata) -> Result<(), StoreError> {
        let path = self.storage.base_dir().join(&self.name).join(METADATA_FILE);
        let bytes =
            serde_json::to_vec(meta).map_err(|e| StoreError::MetadataError(format!("serializing metadata: {}", e)))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StoreError::MetadataError(format!("writing {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::MetadataError(format!("renaming {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Advisory per-document lock: try-lock with bounded jittered backoff.
    async fn acquire_doc_lock(&self, id: &str) -> Result<OwnedMutexGuard<()>, StoreError> {
        let mutex = {
            let mut locks = self.doc_locks.lock();
            locks
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        for _ in 0..LOCK_ATTEMPTS {
            match mutex.clone().try_lock_owned() {
                Ok(guard) => return Ok(guard),
                Err(_) => {
                    let jitter = rand::rng().random_range(0..LOCK_BACKOFF_MS / 2);
                    tokio::time::sleep(Duration::from_millis(LOCK_BACKOFF_MS + jitter)).await;
                }
            }
        }

        Err(StoreError::LockError(format!(
            "document '{}' in collection '{}' is still locked after {} attempts",
            id, self.name, LOCK_ATTEMPTS
        )))
    }
}

/// Maintains `_createdAt`/`_updatedAt` on schemaless collections.
fn stamp_timestamps(doc: &mut Value) {
    let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    if let Some(map) = doc.as_object_mut() {
        if !map.contains_key("_createdAt") {
            map.insert("_createdAt".to_string(), now.clone());
        }
        map.insert("_updatedAt".to_string(), now);
    }
}
