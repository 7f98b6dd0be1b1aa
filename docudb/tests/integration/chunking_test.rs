// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunking Integration Tests
//!
//! Large documents through a small chunk size: multiple compressed chunk
//! files on disk, exact round-trips, and stale-chunk cleanup when documents
//! shrink.

use serde_json::{json, Map, Value};

use docudb::DatabaseConfig;

use crate::common::{id_of, open_database};

fn large_document() -> Value {
    let mut details = Map::new();
    for i in 0..100 {
        details.insert(format!("key_{:03}", i), json!(format!("value number {}", i)));
    }
    json!({
        "description": "a".repeat(10_000),
        "details": Value::Object(details),
    })
}

async fn chunk_files(dir: &std::path::Path) -> Vec<String> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await.unwrap();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    names.sort();
    names
}

#[tokio::test]
async fn test_large_document_spans_compressed_chunks() {
    let (_dir, db) = open_database(
        DatabaseConfig::new()
            .with_name("chunkdb")
            .with_chunk_size(512)
            .with_compression(true),
    )
    .await;
    let docs = db.collection("docs").await.unwrap();

    let stored = docs.insert_one(large_document()).await.unwrap();
    let id = id_of(&stored);

    let names = chunk_files(&db.path().join("docs").join(&id)).await;
    assert!(names.len() > 1, "expected multiple chunks, got {:?}", names);
    assert!(names.iter().all(|name| name.starts_with("chunk_") && name.ends_with(".gz")));

    let loaded = docs.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(loaded["description"].as_str().unwrap().len(), 10_000);
    assert_eq!(loaded["details"].as_object().unwrap().len(), 100);
    assert_eq!(loaded["details"]["key_042"], json!("value number 42"));
}

#[tokio::test]
async fn test_shrinking_document_drops_stale_chunks() {
    let (_dir, db) = open_database(
        DatabaseConfig::new()
            .with_name("chunkdb")
            .with_chunk_size(256)
            .with_compression(false),
    )
    .await;
    let docs = db.collection("docs").await.unwrap();

    let stored = docs
        .insert_one(json!({"payload": "x".repeat(4000)}))
        .await
        .unwrap();
    let id = id_of(&stored);
    let doc_dir = db.path().join("docs").join(&id);
    let before = chunk_files(&doc_dir).await;
    assert!(before.len() > 10);

    docs.update_by_id(&id, json!({"$set": {"payload": "short"}}))
        .await
        .unwrap();

    let after = chunk_files(&doc_dir).await;
    assert_eq!(after, vec!["chunk_0.json"]);
    let loaded = docs.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(loaded["payload"], json!("short"));
}

#[tokio::test]
async fn test_uncompressed_chunks_use_json_extension() {
    let (_dir, db) = open_database(
        DatabaseConfig::new()
            .with_name("chunkdb")
            .with_chunk_size(128)
            .with_compression(false),
    )
    .await;
    let docs = db.collection("docs").await.unwrap();
    let stored = docs.insert_one(json!({"text": "y".repeat(500)})).await.unwrap();

    let names = chunk_files(&db.path().join("docs").join(id_of(&stored))).await;
    assert!(names.len() > 1);
    assert!(names.iter().all(|name| name.ends_with(".json")));

    // Joined plain chunks are exactly the document's JSON serialization
    let mut indexed: Vec<(u64, &String)> = names
        .iter()
        .map(|name| {
            let digits = name.strip_prefix("chunk_").unwrap().strip_suffix(".json").unwrap();
            (digits.parse().unwrap(), name)
        })
        .collect();
    indexed.sort();

    let doc_dir = db.path().join("docs").join(id_of(&stored));
    let mut joined = Vec::new();
    for (_, file) in indexed {
        joined.extend(tokio::fs::read(doc_dir.join(file)).await.unwrap());
    }
    let parsed: serde_json::Value = serde_json::from_slice(&joined).unwrap();
    assert_eq!(parsed["text"], stored["text"]);
}
