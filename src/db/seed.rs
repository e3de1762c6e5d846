// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Default catalog data and the seed-once routine.
//!
//! A collection is seeded only when it is empty. There is no separate
//! "already seeded" flag: if every document is deleted externally, the
//! next initialization seeds again.

use crate::db::query::Document;
use crate::db::{Backend, Collection};
use crate::error::AppError;
use crate::models::{Activity, SeedTeacher};
use futures_util::{stream, StreamExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const MAX_CONCURRENT_SEED_INSERTS: usize = 16;

/// Built-in catalog, used unless `SEED_DATA_PATH` points elsewhere.
const DEFAULT_SEED_JSON: &str = include_str!("../../data/seed.json");

/// Static seed input: activities keyed by name, staff with plaintext passwords.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub activities: BTreeMap<String, Activity>,
    pub teachers: Vec<SeedTeacher>,
}

/// Seed documents ready for insertion, passwords already hashed.
#[derive(Debug, Clone)]
pub struct PreparedSeed {
    pub activities: Vec<Document>,
    pub teachers: Vec<Document>,
}

/// How many documents each collection received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub activities_inserted: usize,
    pub teachers_inserted: usize,
}

impl SeedData {
    /// The built-in Mergington catalog.
    pub fn default_catalog() -> Result<Self, SeedError> {
        Self::load_from_json(DEFAULT_SEED_JSON)
    }

    /// Load seed data from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| SeedError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load seed data from a JSON string.
    pub fn load_from_json(json_data: &str) -> Result<Self, SeedError> {
        let seed: Self =
            serde_json::from_str(json_data).map_err(|e| SeedError::ParseError(e.to_string()))?;

        if let Some((name, _)) = seed
            .activities
            .iter()
            .find(|(_, activity)| activity.max_participants == 0)
        {
            return Err(SeedError::InvalidCapacity(name.clone()));
        }

        tracing::debug!(
            activities = seed.activities.len(),
            teachers = seed.teachers.len(),
            "Loaded seed data"
        );
        Ok(seed)
    }

    /// Build insertable documents, hashing every staff password.
    ///
    /// Hashing runs for the whole staff list even if the teachers
    /// collection turns out to be populated already.
    pub fn prepare(&self) -> Result<PreparedSeed, AppError> {
        let activities = self
            .activities
            .iter()
            .map(|(name, activity)| activity.to_document(name))
            .collect::<Result<Vec<_>, _>>()?;

        let teachers = self
            .teachers
            .iter()
            .cloned()
            .map(|seed| seed.into_teacher()?.to_document())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PreparedSeed {
            activities,
            teachers,
        })
    }
}

/// Seed both collections of a backend, skipping any that are non-empty.
pub async fn ensure_seeded(backend: &Backend, seed: &PreparedSeed) -> Result<SeedReport, AppError> {
    Ok(SeedReport {
        activities_inserted: seed_collection(backend.activities(), &seed.activities).await?,
        teachers_inserted: seed_collection(backend.teachers(), &seed.teachers).await?,
    })
}

async fn seed_collection(collection: &Collection, documents: &[Document]) -> Result<usize, AppError> {
    if !collection.is_empty().await? {
        tracing::debug!(
            collection = collection.name(),
            "Collection already populated, skipping seed"
        );
        return Ok(0);
    }

    let inserted = insert_missing(collection, documents).await?;
    tracing::info!(
        collection = collection.name(),
        count = inserted,
        "Seeded collection"
    );
    Ok(inserted)
}

/// Insert every document, counting ids another writer already created as present.
async fn insert_missing(collection: &Collection, documents: &[Document]) -> Result<usize, AppError> {
    let outcomes = stream::iter(documents.iter().cloned())
        .map(|doc| async move { collection.insert_one(doc).await })
        .buffer_unordered(MAX_CONCURRENT_SEED_INSERTS)
        .collect::<Vec<_>>()
        .await;

    let mut inserted = 0;
    for outcome in outcomes {
        match outcome {
            Ok(_) => inserted += 1,
            Err(AppError::DuplicateKey(id)) => {
                tracing::debug!(
                    collection = collection.name(),
                    id = %id,
                    "Seed document already present"
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(inserted)
}

/// Errors from loading seed data.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file: {0}")]
    IoError(String),

    #[error("Failed to parse seed data: {0}")]
    ParseError(String),

    #[error("Activity {0:?} has zero capacity")]
    InvalidCapacity(String),
}
