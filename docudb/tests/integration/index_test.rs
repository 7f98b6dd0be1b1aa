// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Index Integration Tests
//!
//! Unique and compound constraint enforcement through the collection
//! controller, index-assisted queries, back-filling, and index lifecycle.

use serde_json::json;

use docudb::{IndexOptions, StoreError};

use crate::common::{id_of, open_default_database};

fn unique() -> IndexOptions {
    IndexOptions {
        unique: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_unique_index_blocks_duplicate_insert() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products.create_index(&["codigo"], unique()).await.unwrap();

    products
        .insert_one(json!({"name": "P1", "codigo": "ABC123"}))
        .await
        .unwrap();
    let err = products
        .insert_one(json!({"name": "P2", "codigo": "ABC123"}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation(_)));

    // The rejected insert left nothing behind
    assert_eq!(products.count(json!({})).await.unwrap(), 1);
    let order = products.metadata().await.document_order;
    assert_eq!(order.len(), 1);
}

#[tokio::test]
async fn test_unique_violation_leaves_no_orphan_chunks() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products.create_index(&["sku"], unique()).await.unwrap();

    products.insert_one(json!({"sku": "S1"})).await.unwrap();
    let explicit_id = "507f1f77bcf86cd799439099";
    let err = products
        .insert_one(json!({"_id": explicit_id, "sku": "S1"}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation(_)));
    // Index update runs before chunk persistence, so no directory appeared
    assert!(!db.path().join("products").join(explicit_id).exists());
}

#[tokio::test]
async fn test_compound_unique_index() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products
        .create_index(&["categoria", "name"], unique())
        .await
        .unwrap();

    products
        .insert_one(json!({"name": "Laptop", "categoria": "Electronics", "codigo": "LAP001"}))
        .await
        .unwrap();
    let err = products
        .insert_one(json!({"name": "Laptop", "categoria": "Electronics", "codigo": "LAP002"}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation(_)));

    // Same category, different name: passes
    products
        .insert_one(json!({"name": "Laptop Pro", "categoria": "Electronics", "codigo": "LAP003"}))
        .await
        .unwrap();
    assert_eq!(products.count(json!({})).await.unwrap(), 2);
}

#[tokio::test]
async fn test_create_index_backfills_existing_documents() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products.insert_one(json!({"sku": "A"})).await.unwrap();
    products.insert_one(json!({"sku": "B"})).await.unwrap();

    products.create_index(&["sku"], unique()).await.unwrap();

    // The back-filled index serves lookups and enforces uniqueness
    let hits = products.find(json!({"sku": "A"})).await.unwrap();
    assert_eq!(hits.len(), 1);
    let err = products.insert_one(json!({"sku": "B"})).await.unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation(_)));
}

#[tokio::test]
async fn test_backfill_over_conflicting_documents_fails() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products.insert_one(json!({"sku": "DUP"})).await.unwrap();
    products.insert_one(json!({"sku": "DUP"})).await.unwrap();

    let err = products.create_index(&["sku"], unique()).await.unwrap_err();
    assert!(matches!(err, StoreError::UniqueViolation(_)));
}

#[tokio::test]
async fn test_index_assisted_find_rechecks_full_criteria() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products.create_index(&["categoria"], IndexOptions::default()).await.unwrap();

    products
        .insert_many(vec![
            json!({"categoria": "tools", "price": 10}),
            json!({"categoria": "tools", "price": 99}),
            json!({"categoria": "toys", "price": 99}),
        ])
        .await
        .unwrap();

    // The categoria index narrows candidates; the price predicate still
    // applies
    let hits = products
        .find(json!({"categoria": "tools", "price": {"$gt": 50}}))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["price"], json!(99));

    // Empty bucket: falls back to a scan and finds nothing
    let none = products.find(json!({"categoria": "food"})).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_create_index_is_idempotent_in_metadata() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products.create_index(&["sku"], unique()).await.unwrap();
    products.create_index(&["sku"], unique()).await.unwrap();
    products.create_index(&["sku"], IndexOptions::default()).await.unwrap();

    let meta = products.metadata().await;
    assert_eq!(meta.indices, vec!["sku"]);
    assert_eq!(products.list_indexes().await.len(), 1);
    // The original unique definition survived the repeats
    assert!(products.list_indexes().await[0].unique);
}

#[tokio::test]
async fn test_list_and_drop_index() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products.create_index(&["sku"], unique()).await.unwrap();
    products
        .create_index(
            &["categoria", "name"],
            IndexOptions {
                sparse: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let listed = products.list_indexes().await;
    assert_eq!(listed.len(), 2);
    let compound = listed.iter().find(|info| info.field == "categoria+name").unwrap();
    assert!(compound.sparse);
    assert!(!compound.unique);

    assert!(products.drop_index("sku").await.unwrap());
    assert_eq!(products.list_indexes().await.len(), 1);
    assert_eq!(products.metadata().await.indices, vec!["categoria+name"]);
    assert!(!products.drop_index("sku").await.unwrap());

    // The dropped constraint no longer applies
    products.insert_one(json!({"sku": "X"})).await.unwrap();
    products.insert_one(json!({"sku": "X"})).await.unwrap();
}

#[tokio::test]
async fn test_unique_bucket_never_exceeds_one_entry() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products.create_index(&["sku"], unique()).await.unwrap();

    let first = products.insert_one(json!({"sku": "S"})).await.unwrap();
    // Moving the value away frees the bucket for another document
    products
        .update_by_id(&id_of(&first), json!({"$set": {"sku": "T"}}))
        .await
        .unwrap();
    products.insert_one(json!({"sku": "S"})).await.unwrap();

    let s_hits = products.find(json!({"sku": "S"})).await.unwrap();
    let t_hits = products.find(json!({"sku": "T"})).await.unwrap();
    assert_eq!(s_hits.len(), 1);
    assert_eq!(t_hits.len(), 1);
}
