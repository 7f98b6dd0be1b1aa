// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Persistence Integration Tests
//!
//! Everything must survive a close-and-reopen on the same data directory:
//! documents, stable order, metadata counters, and index constraints.

use serde_json::json;

use docudb::{Database, DatabaseConfig, IndexOptions, StoreError};
use tempfile::TempDir;

use crate::common::id_of;

fn config() -> DatabaseConfig {
    DatabaseConfig::new().with_name("persistdb").with_chunk_size(256)
}

async fn reopen(dir: &TempDir) -> Database {
    let db = Database::new(config().with_data_dir(dir.path())).unwrap();
    db.initialize().await.unwrap();
    db
}

#[tokio::test]
async fn test_documents_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let mut ids = Vec::new();
    {
        let db = reopen(&dir).await;
        let products = db.collection("products").await.unwrap();
        for i in 0..3 {
            let stored = products
                .insert_one(json!({"n": i, "name": format!("item-{}", i)}))
                .await
                .unwrap();
            ids.push(id_of(&stored));
        }
    }

    let db = reopen(&dir).await;
    // The collection was discovered from disk during initialize
    assert_eq!(db.list_collections().await, vec!["products"]);
    let products = db.collection("products").await.unwrap();

    let all = products.find(json!({})).await.unwrap();
    assert_eq!(all.len(), 3);
    let loaded_ids: Vec<String> = all.iter().map(id_of).collect();
    assert_eq!(loaded_ids, ids);
    assert_eq!(all[1]["name"], json!("item-1"));
    assert_eq!(products.count(json!({})).await.unwrap(), 3);
}

#[tokio::test]
async fn test_unique_index_enforced_after_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let db = reopen(&dir).await;
        let products = db.collection("products").await.unwrap();
        products
            .create_index(
                &["codigo"],
                IndexOptions {
                    unique: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        products.insert_one(json!({"codigo": "ABC123"})).await.unwrap();
    }

    let db = reopen(&dir).await;
    let products = db.collection("products").await.unwrap();

    // The rehydrated index still lists and still rejects
    let listed = products.list_indexes().await;
    assert_eq!(listed.len(), 1);
    assert!(listed[0].unique);
    let err = products.insert_one(json!({"codigo": "ABC123"})).await.unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation(_)));
}

#[tokio::test]
async fn test_document_order_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut ids = Vec::new();
    {
        let db = reopen(&dir).await;
        let items = db.collection("items").await.unwrap();
        for i in 0..4 {
            ids.push(id_of(&items.insert_one(json!({"i": i})).await.unwrap()));
        }
        // Reorder before closing
        items.update_position(&ids[3], 0).await.unwrap();
    }

    let db = reopen(&dir).await;
    let items = db.collection("items").await.unwrap();
    assert_eq!(items.get_position(&ids[3]).await.unwrap(), 0);
    let all = items.find(json!({})).await.unwrap();
    let order: Vec<String> = all.iter().map(id_of).collect();
    assert_eq!(order, vec![ids[3].clone(), ids[0].clone(), ids[1].clone(), ids[2].clone()]);
}

#[tokio::test]
async fn test_deletes_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let kept;
    {
        let db = reopen(&dir).await;
        let items = db.collection("items").await.unwrap();
        let a = items.insert_one(json!({"k": "a"})).await.unwrap();
        let b = items.insert_one(json!({"k": "b"})).await.unwrap();
        kept = id_of(&b);
        items.delete_by_id(&id_of(&a)).await.unwrap();
    }

    let db = reopen(&dir).await;
    let items = db.collection("items").await.unwrap();
    assert_eq!(items.count(json!({})).await.unwrap(), 1);
    assert_eq!(id_of(&items.find(json!({})).await.unwrap()[0]), kept);
}
