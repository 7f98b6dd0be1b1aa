// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document Order Integration Tests
//!
//! The stable enumeration order: position lookups, reordering with clamping,
//! and enumeration agreement after reorders.

use serde_json::json;

use docudb::StoreError;

use crate::common::{id_of, open_default_database};

async fn insert_five(items: &docudb::Collection) -> Vec<String> {
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(id_of(&items.insert_one(json!({"i": i})).await.unwrap()));
    }
    ids
}

#[tokio::test]
async fn test_reorder_and_enumerate() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    let ids = insert_five(&items).await;

    items.update_position(&ids[0], 1).await.unwrap();

    let all = items.find(json!({})).await.unwrap();
    let order: Vec<String> = all.iter().map(id_of).collect();
    assert_eq!(
        order,
        vec![ids[1].clone(), ids[0].clone(), ids[2].clone(), ids[3].clone(), ids[4].clone()]
    );
    assert_eq!(items.get_position(&ids[0]).await.unwrap(), 1);
    assert_eq!(items.get_position(&ids[1]).await.unwrap(), 0);
}

#[tokio::test]
async fn test_position_past_end_clamps_to_last() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    let ids = insert_five(&items).await;

    items.update_position(&ids[1], 100).await.unwrap();
    assert_eq!(items.get_position(&ids[1]).await.unwrap(), 4);

    let all = items.find(json!({})).await.unwrap();
    assert_eq!(id_of(&all[4]), ids[1]);
}

#[tokio::test]
async fn test_same_position_is_a_noop() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    let ids = insert_five(&items).await;

    items.update_position(&ids[2], 2).await.unwrap();
    let order = items.metadata().await.document_order;
    assert_eq!(order, ids);
}

#[tokio::test]
async fn test_negative_positions_are_rejected() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    let ids = insert_five(&items).await;

    assert!(matches!(
        items.update_position(&ids[0], -1).await.unwrap_err(),
        StoreError::InvalidPosition(_)
    ));
    assert!(matches!(
        items.find_by_position(-3).await.unwrap_err(),
        StoreError::InvalidPosition(_)
    ));
}

#[tokio::test]
async fn test_find_by_position() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    let ids = insert_five(&items).await;

    let third = items.find_by_position(2).await.unwrap().unwrap();
    assert_eq!(id_of(&third), ids[2]);
    assert!(items.find_by_position(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_position_of_missing_document_fails() {
    let (_dir, db) = open_default_database().await;
    let items = db.collection("items").await.unwrap();
    insert_five(&items).await;

    let err = items
        .update_position("507f1f77bcf86cd799439011", 0)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}
