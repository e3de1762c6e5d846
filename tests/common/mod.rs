// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use mergington_directory::config::Config;
use mergington_directory::db::{Collection, Database, Document};
use serde_json::Value;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a database that always falls back to memory.
#[allow(dead_code)]
pub fn test_db_offline() -> Database {
    Database::in_memory(Config::default())
}

/// Create a database bound to the Firestore emulator.
#[allow(dead_code)]
pub fn test_db() -> Database {
    Database::new(Config::default())
}

/// Seeded activities collection from an offline database.
#[allow(dead_code)]
pub async fn offline_activities() -> Collection {
    test_db_offline()
        .get_activities_collection()
        .await
        .expect("Fallback activities should be available")
}

/// Convert a `json!` object literal into a document.
#[allow(dead_code)]
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Identity keys of a result set, in order.
#[allow(dead_code)]
pub fn ids(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .map(|d| d["_id"].as_str().expect("result without _id").to_string())
        .collect()
}
