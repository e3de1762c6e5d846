// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store used when Firestore is unreachable.
//!
//! Storage is a `DashMap` keyed by identity. Single-document writes hold the
//! entry's shard lock for the whole read-modify-write, so concurrent
//! `$push`/`$pull` calls never lose updates. Nothing here survives a
//! process restart.

use crate::db::query::{self, Document, InsertOneResult, Query, Update, UpdateResult};
use crate::error::AppError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory collection handle. Clones share the same storage.
#[derive(Clone, Debug)]
pub struct MemoryCollection {
    name: &'static str,
    storage: Arc<DashMap<String, Document>>,
}

impl MemoryCollection {
    /// Create an empty collection.
    pub fn new(name: &'static str) -> Self {
        Self::with_storage(name, Arc::new(DashMap::new()))
    }

    /// Bind a handle to existing storage.
    pub fn with_storage(name: &'static str, storage: Arc<DashMap<String, Document>>) -> Self {
        Self { name, storage }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Every document matching `query`, ordered by identity key.
    ///
    /// Results are deep copies annotated with `_id`.
    pub fn find(&self, query: &Query) -> Vec<Document> {
        let mut matches: Vec<(String, Document)> = self
            .storage
            .iter()
            .filter(|entry| query.matches(entry.key(), entry.value()))
            .map(|entry| (entry.key().clone(), query::with_id(entry.key(), entry.value())))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0));
        matches.into_iter().map(|(_, doc)| doc).collect()
    }

    /// Look up one document. The query must name an `_id`; any other shape
    /// returns `None` without scanning.
    pub fn find_one(&self, query: &Query) -> Option<Document> {
        let Some(id) = query.id() else {
            tracing::debug!(collection = self.name, "find_one without _id matches nothing");
            return None;
        };
        let entry = self.storage.get(id)?;
        query
            .matches(id, entry.value())
            .then(|| query::with_id(id, entry.value()))
    }

    /// Apply `update` to the document named by the query's `_id`.
    ///
    /// `modified_count` is 1 only when an operator actually changed the
    /// document; a `$pull` of an absent value reports 0.
    pub fn update_one(&self, query: &Query, update: &Update) -> Result<UpdateResult, AppError> {
        let Some(id) = query.id() else {
            tracing::debug!(collection = self.name, "update_one without _id matches nothing");
            return Ok(UpdateResult::unmatched());
        };
        let Some(mut entry) = self.storage.get_mut(id) else {
            return Ok(UpdateResult::unmatched());
        };
        if !query.matches(id, entry.value()) {
            return Ok(UpdateResult::unmatched());
        }

        let mut updated = entry.value().clone();
        let changed = update.apply(&mut updated)?;
        if changed {
            *entry.value_mut() = updated;
        }
        Ok(UpdateResult::matched(changed))
    }

    /// Insert a document carrying its identity under `_id`.
    pub fn insert_one(&self, document: Document) -> Result<InsertOneResult, AppError> {
        let (id, body) = query::split_id(document)?;
        match self.storage.entry(id) {
            Entry::Occupied(occupied) => Err(AppError::DuplicateKey(occupied.key().clone())),
            Entry::Vacant(vacant) => {
                let inserted_id = vacant.key().clone();
                vacant.insert(body);
                Ok(InsertOneResult { inserted_id })
            }
        }
    }

    /// Number of documents matching `query`.
    pub fn count_documents(&self, query: &Query) -> u64 {
        if query.is_empty() {
            return self.storage.len() as u64;
        }
        self.storage
            .iter()
            .filter(|entry| query.matches(entry.key(), entry.value()))
            .count() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::query::ID_FIELD;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    fn collection() -> MemoryCollection {
        let coll = MemoryCollection::new("activities");
        coll.insert_one(doc(json!({
            "_id": "Art Club",
            "participants": ["amelia@mergington.edu"],
            "schedule_details": {"days": ["Thursday"]}
        })))
        .unwrap();
        coll.insert_one(doc(json!({
            "_id": "Chess Club",
            "participants": [],
            "difficulty": "beginner",
            "schedule_details": {"days": ["Monday", "Friday"]}
        })))
        .unwrap();
        coll
    }

    #[test]
    fn test_find_returns_annotated_sorted_copies() {
        let coll = collection();
        let all = coll.find(&Query::all());
        let ids: Vec<_> = all.iter().map(|d| d[ID_FIELD].clone()).collect();
        assert_eq!(ids, vec![json!("Art Club"), json!("Chess Club")]);

        let found = coll.find(&Query::all().exists("difficulty", true));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0][ID_FIELD], json!("Chess Club"));
    }

    #[test]
    fn test_mutating_results_does_not_touch_storage() {
        let coll = collection();
        let mut found = coll.find_one(&Query::by_id("Art Club")).unwrap();
        found.insert("participants".to_string(), json!([]));
        found.remove("schedule_details");

        let again = coll.find_one(&Query::by_id("Art Club")).unwrap();
        assert_eq!(again["participants"], json!(["amelia@mergington.edu"]));
        assert!(again.contains_key("schedule_details"));
    }

    #[test]
    fn test_find_one_requires_identity() {
        let coll = collection();
        assert!(coll
            .find_one(&Query::all().eq("difficulty", "beginner"))
            .is_none());
        assert!(coll.find_one(&Query::by_id("Drama Club")).is_none());
    }

    #[test]
    fn test_insert_rejects_duplicates_and_missing_id() {
        let coll = collection();
        let err = coll
            .insert_one(doc(json!({"_id": "Art Club", "participants": []})))
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey(id) if id == "Art Club"));

        let err = coll.insert_one(doc(json!({"participants": []}))).unwrap_err();
        assert!(matches!(err, AppError::InvalidUpdate(_)));
        assert_eq!(coll.count_documents(&Query::all()), 2);
    }

    #[test]
    fn test_update_without_identity_is_unmatched() {
        let coll = collection();
        let result = coll
            .update_one(
                &Query::all().eq("difficulty", "beginner"),
                &Update::push("participants", "x@mergington.edu"),
            )
            .unwrap();
        assert_eq!(result, UpdateResult::unmatched());
    }

    #[test]
    fn test_count_documents_with_filter() {
        let coll = collection();
        assert_eq!(
            coll.count_documents(&Query::all().any_of("schedule_details.days", ["Friday"])),
            1
        );
        assert!(!coll.is_empty());
        assert!(MemoryCollection::new("teachers").is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let coll = collection();
        let other = coll.clone();
        other
            .update_one(
                &Query::by_id("Chess Club"),
                &Update::push("participants", "new@mergington.edu"),
            )
            .unwrap();

        let found = coll.find_one(&Query::by_id("Chess Club")).unwrap();
        assert_eq!(found["participants"], json!(["new@mergington.edu"]));
    }

    #[test]
    fn test_concurrent_pushes_are_not_lost() {
        let coll = collection();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let coll = coll.clone();
                std::thread::spawn(move || {
                    coll.update_one(
                        &Query::by_id("Chess Club"),
                        &Update::push("participants", format!("student{i}@mergington.edu")),
                    )
                    .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().modified_count, 1);
        }

        let found = coll.find_one(&Query::by_id("Chess Club")).unwrap();
        assert_eq!(found["participants"].as_array().unwrap().len(), 16);
    }
}
