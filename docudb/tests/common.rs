// /////////////////////////////////////////////////////////////////////////////
// DocuDB RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Common Test Helpers
//!
//! Shared utilities for integration tests: every test opens its own database
//! inside a fresh temporary directory, so tests never observe each other.

use std::sync::Once;

use docudb::{Database, DatabaseConfig};
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Installs a warn-level subscriber once so engine logs show up in failing
/// test output. Raise the level locally when debugging a test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .try_init();
    });
}

/// Opens an initialized database inside a fresh temporary directory.
///
/// The `TempDir` guard must be kept alive for the duration of the test; the
/// directory (and everything the engine wrote) disappears when it drops.
pub async fn open_database(config: DatabaseConfig) -> (TempDir, Database) {
    init_tracing();
    let dir = TempDir::new().expect("temp dir");
    let db = Database::new(config.with_data_dir(dir.path())).expect("valid config");
    db.initialize().await.expect("initialize");
    (dir, db)
}

/// Opens an initialized database with default configuration.
pub async fn open_default_database() -> (TempDir, Database) {
    open_database(DatabaseConfig::new().with_name("testdb")).await
}

/// Extracts the `_id` string from a stored document.
pub fn id_of(doc: &serde_json::Value) -> String {
    doc["_id"].as_str().expect("_id is a string").to_string()
}
