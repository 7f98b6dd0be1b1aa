// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Update Operator Integration Tests
//!
//! `$set`/`$unset`/`$inc` and the array operators through the collection
//! controller, the replacement shorthand, operator validation, and
//! `update_many`.

use serde_json::json;

use docudb::StoreError;

use crate::common::{id_of, open_default_database};

#[tokio::test]
async fn test_set_and_inc_update_document_and_metadata() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    let stored = products.insert_one(json!({"price": 100, "stock": 5})).await.unwrap();
    let id = id_of(&stored);
    let before = products.metadata().await.updated;

    let updated = products
        .update_by_id(&id, json!({"$set": {"price": 180}, "$inc": {"stock": -2}}))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated["price"], json!(180));
    assert_eq!(updated["stock"], json!(3));
    assert_eq!(updated["_id"], json!(id));

    // The collection's updated timestamp moved strictly forward
    let after = products.metadata().await.updated;
    assert!(after > before);

    // And the change persisted through the chunk files
    let loaded = products.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(loaded["price"], json!(180));
}

#[tokio::test]
async fn test_update_missing_document_is_none() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    let result = products
        .update_by_id("507f1f77bcf86cd799439011", json!({"$set": {"a": 1}}))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_replacement_shorthand_merges_and_keeps_id() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    let stored = products.insert_one(json!({"a": 1, "b": 2})).await.unwrap();
    let id = id_of(&stored);

    let updated = products
        .update_by_id(&id, json!({"b": 20, "c": 30}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated["a"], json!(1));
    assert_eq!(updated["b"], json!(20));
    assert_eq!(updated["c"], json!(30));
    assert_eq!(updated["_id"], json!(id));
}

#[tokio::test]
async fn test_unknown_operator_is_invalid_update() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    let stored = products.insert_one(json!({"a": 1})).await.unwrap();
    let err = products
        .update_by_id(&id_of(&stored), json!({"$rename": {"a": "b"}}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidUpdate(_)));
}

#[tokio::test]
async fn test_array_operators_roundtrip() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    let stored = products.insert_one(json!({"tags": ["new"]})).await.unwrap();
    let id = id_of(&stored);

    products
        .update_by_id(&id, json!({"$push": {"tags": "sale"}}))
        .await
        .unwrap();
    products
        .update_by_id(&id, json!({"$addToSet": {"tags": "sale"}}))
        .await
        .unwrap();
    products
        .update_by_id(&id, json!({"$addToSet": {"tags": "clearance"}}))
        .await
        .unwrap();
    products
        .update_by_id(&id, json!({"$pull": {"tags": "new"}}))
        .await
        .unwrap();

    let loaded = products.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(loaded["tags"], json!(["sale", "clearance"]));
}

#[tokio::test]
async fn test_inc_on_non_numeric_field_fails() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    let stored = products.insert_one(json!({"name": "Laptop"})).await.unwrap();
    let err = products
        .update_by_id(&id_of(&stored), json!({"$inc": {"name": 1}}))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidType(_)));
}

#[tokio::test]
async fn test_update_many_counts_successes() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products
        .insert_many(vec![
            json!({"kind": "a", "n": 1}),
            json!({"kind": "a", "n": 2}),
            json!({"kind": "b", "n": 3}),
        ])
        .await
        .unwrap();

    let updated = products
        .update_many(json!({"kind": "a"}), json!({"$inc": {"n": 10}}))
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let values: Vec<i64> = products
        .find(json!({}))
        .await
        .unwrap()
        .iter()
        .map(|doc| doc["n"].as_i64().unwrap())
        .collect();
    assert_eq!(values, vec![11, 12, 3]);
}

#[tokio::test]
async fn test_delete_many_by_criteria() {
    let (_dir, db) = open_default_database().await;
    let products = db.collection("products").await.unwrap();
    products
        .insert_many(vec![
            json!({"kind": "a"}),
            json!({"kind": "b"}),
            json!({"kind": "a"}),
        ])
        .await
        .unwrap();

    assert_eq!(products.delete_many(json!({"kind": "a"})).await.unwrap(), 2);
    assert_eq!(products.count(json!({})).await.unwrap(), 1);
}
