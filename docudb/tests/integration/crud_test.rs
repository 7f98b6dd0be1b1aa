// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CRUD Integration Tests
//!
//! Insert/find/delete flows through the full stack: schema-less collections,
//! operator queries, round-trip fidelity, and the bookkeeping invariants
//! (count, document order, on-disk directories).

use serde_json::json;

use docudb::{Query, SortOrder, StoreError};

use crate::common::{id_of, open_default_database};

#[tokio::test]
async fn test_insert_and_query_with_operator() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();

    products
        .insert_many(vec![
            json!({"name": "Laptop", "price": 1000, "stock": 5}),
            json!({"name": "Mouse", "price": 20, "stock": 10}),
            json!({"name": "Keyboard", "price": 50, "stock": 8}),
        ])
        .await
        .unwrap();

    let expensive = products.find(json!({"price": {"$gt": 50}})).await.unwrap();
    assert_eq!(expensive.len(), 1);
    assert_eq!(expensive[0]["name"], json!("Laptop"));
}

#[tokio::test]
async fn test_insert_roundtrips_content_exactly() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();

    let doc = json!({
        "name": "Archive",
        "added": "2024-05-01T10:30:00.000Z",
        "weights": [1, 2.5, 3],
        "nested": {"tags": ["a", "b"], "meta": {"flag": true, "note": null}},
        "big": 9_007_199_254_740_991i64
    });
    let stored = items.insert_one(doc.clone()).await.unwrap();
    let id = id_of(&stored);

    let loaded = items.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(loaded["name"], doc["name"]);
    assert_eq!(loaded["added"], doc["added"]);
    assert_eq!(loaded["weights"], doc["weights"]);
    assert_eq!(loaded["nested"], doc["nested"]);
    // Numeric identity for IEEE-754 representable integers
    assert_eq!(loaded["big"], json!(9_007_199_254_740_991i64));

    // The stored date still behaves as an instant in queries
    let hits = items
        .find(json!({"added": {"$gt": "2024-01-01T00:00:00Z"}}))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn test_find_by_id_missing_is_none() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    let missing = items.find_by_id("507f1f77bcf86cd799439011").await.unwrap();
    assert!(missing.is_none());
    // Malformed ids are a distinct failure
    assert!(matches!(
        items.find_by_id("nope").await.unwrap_err(),
        StoreError::InvalidId(_)
    ));
}

#[tokio::test]
async fn test_count_matches_order_and_directories() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    for i in 0..4 {
        items.insert_one(json!({"i": i})).await.unwrap();
    }
    items.delete_one(json!({"i": 1})).await.unwrap();

    let count = items.count(json!({})).await.unwrap();
    let meta = items.metadata().await;
    assert_eq!(count, 3);
    assert_eq!(meta.document_order.len(), 3);

    // Non-underscore directories on disk agree
    let mut dirs = 0;
    let mut entries = tokio::fs::read_dir(db.path().join("items")).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.file_type().await.unwrap().is_dir() && !name.starts_with('_') {
            dirs += 1;
        }
    }
    assert_eq!(dirs, 3);
}

#[tokio::test]
async fn test_delete_then_lookup_yields_nothing() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    let stored = items.insert_one(json!({"a": 1})).await.unwrap();
    let id = id_of(&stored);

    assert!(items.delete_by_id(&id).await.unwrap());
    assert!(items.find_by_id(&id).await.unwrap().is_none());
    assert_eq!(items.get_position(&id).await.unwrap(), -1);
    // Deleting again reports absence
    assert!(!items.delete_by_id(&id).await.unwrap());
}

#[tokio::test]
async fn test_insert_delete_cycles_leave_no_files() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();

    for _ in 0..2 {
        let stored = items.insert_one(json!({"payload": "x".repeat(100)})).await.unwrap();
        let id = id_of(&stored);
        let doc_dir = db.path().join("items").join(&id);
        assert!(doc_dir.exists());
        assert!(items.delete_by_id(&id).await.unwrap());
        assert!(!doc_dir.exists());
    }
    assert_eq!(items.count(json!({})).await.unwrap(), 0);
}

#[tokio::test]
async fn test_find_one_and_count_with_criteria() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    items
        .insert_many(vec![
            json!({"kind": "a", "n": 1}),
            json!({"kind": "b", "n": 2}),
            json!({"kind": "a", "n": 3}),
        ])
        .await
        .unwrap();

    let first_a = items.find_one(json!({"kind": "a"})).await.unwrap().unwrap();
    assert_eq!(first_a["n"], json!(1));
    assert!(items.find_one(json!({"kind": "z"})).await.unwrap().is_none());
    assert_eq!(items.count(json!({"kind": "a"})).await.unwrap(), 2);
}

#[tokio::test]
async fn test_prepared_query_with_sort_limit_projection() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    items
        .insert_many(vec![
            json!({"name": "c", "rank": 3, "extra": 1}),
            json!({"name": "a", "rank": 1, "extra": 2}),
            json!({"name": "b", "rank": 2, "extra": 3}),
        ])
        .await
        .unwrap();

    let query = Query::new(json!({}))
        .unwrap()
        .with_sort("rank", SortOrder::Desc)
        .with_limit(2)
        .with_select(["name"]);
    let result = items.query(&query).await.unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result[0]["name"], json!("c"));
    assert_eq!(result[1]["name"], json!("b"));
    // Projection keeps _id and drops unselected fields
    assert!(result[0].get("_id").is_some());
    assert!(result[0].get("extra").is_none());
    assert!(result[0].get("rank").is_none());
}

#[tokio::test]
async fn test_insert_many_keeps_prefix_on_failure() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();

    let err = items
        .insert_many(vec![
            json!({"ok": 1}),
            json!({"ok": 2}),
            json!("not a document"),
            json!({"ok": 4}),
        ])
        .await
        .unwrap_err();
    match err {
        StoreError::InsertError(msg) => assert!(msg.contains("document 2")),
        other => panic!("expected InsertError, got {:?}", other),
    }
    // The documents before the failure remain
    assert_eq!(items.count(json!({})).await.unwrap(), 2);
}
