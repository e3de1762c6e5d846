// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper and live collection handle.
//!
//! Documents are read and written as untyped JSON maps so the live handle
//! exposes exactly the same contract as the in-memory store:
//! - the Firestore document id is surfaced as `_id`
//! - queries are evaluated with the shared matcher (equality clauses are
//!   also pushed down to Firestore to narrow the read)
//! - `$push`/`$pull` go through the shared update logic inside a transaction

use crate::db::collections;
use crate::db::query::{self, Document, InsertOneResult, Query, Update, UpdateResult};
use crate::error::AppError;
use firestore::errors::FirestoreError;
use serde_json::Value;
use std::time::Duration;

/// Field the Firestore deserializer fills with the document id.
const FIRESTORE_ID_FIELD: &str = "_firestore_id";
/// Prefix of the bookkeeping fields the Firestore deserializer injects.
const FIRESTORE_META_PREFIX: &str = "_firestore_";

const MAX_TRANSACTION_ATTEMPTS: u32 = 10;
const TRANSACTION_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::debug!(project = project_id, "Firestore client created");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::debug!(
            project = project_id,
            "Firestore client created (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    /// Connect and prove the database answers a read.
    ///
    /// Client construction alone can succeed without reaching the server,
    /// so a one-document read of the activities collection follows.
    pub async fn connect(project_id: &str) -> Result<Self, AppError> {
        let db = Self::new(project_id).await?;
        db.collection(collections::ACTIVITIES).is_empty().await?;
        tracing::info!(project = project_id, "Connected to Firestore");
        Ok(db)
    }

    /// Handle to a named collection.
    pub fn collection(&self, name: &'static str) -> FirestoreCollection {
        FirestoreCollection {
            db: self.clone(),
            name,
        }
    }
}

/// Live collection handle.
#[derive(Clone)]
pub struct FirestoreCollection {
    db: FirestoreDb,
    name: &'static str,
}

impl FirestoreCollection {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Every document matching `query`, ordered by identity key.
    pub async fn find(&self, query: &Query) -> Result<Vec<Document>, AppError> {
        if query.id().is_some() {
            return Ok(self.find_one(query).await?.into_iter().collect());
        }

        let equalities: Vec<(String, Value)> = query
            .equality_clauses()
            .map(|(field, value)| (field.to_string(), value.clone()))
            .collect();

        let select = self.db.client.fluent().select().from(self.name);
        let raw: Vec<Value> = if equalities.is_empty() {
            select.obj::<Value>().query().await
        } else {
            select
                .filter(move |q| {
                    q.for_all(
                        equalities
                            .iter()
                            .map(|(field, value)| q.field(field.as_str()).eq(value.clone())),
                    )
                })
                .obj::<Value>()
                .query()
                .await
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        let mut found: Vec<(String, Document)> = raw
            .into_iter()
            .filter_map(|doc| self.normalize(doc, None))
            .filter(|(id, body)| query.matches(id, body))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(found
            .into_iter()
            .map(|(id, body)| query::with_id(&id, &body))
            .collect())
    }

    /// Direct lookup by the query's `_id`. Other query shapes return `None`.
    pub async fn find_one(&self, query: &Query) -> Result<Option<Document>, AppError> {
        let Some(id) = query.id() else {
            tracing::debug!(collection = self.name, "find_one without _id matches nothing");
            return Ok(None);
        };

        let raw: Option<Value> = self
            .db
            .client
            .fluent()
            .select()
            .by_id_in(self.name)
            .obj::<Value>()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(raw
            .and_then(|doc| self.normalize(doc, Some(id)))
            .filter(|(id, body)| query.matches(id, body))
            .map(|(id, body)| query::with_id(&id, &body)))
    }

    /// Apply `update` to the document addressed by the query's `_id`.
    ///
    /// The read and the write run in one Firestore transaction, so
    /// concurrent pushes to the same roster are serialized. Contended
    /// transactions are retried a bounded number of times.
    pub async fn update_one(
        &self,
        query: &Query,
        update: &Update,
    ) -> Result<UpdateResult, AppError> {
        let Some(id) = query.id() else {
            tracing::debug!(collection = self.name, "update_one without _id matches nothing");
            return Ok(UpdateResult::unmatched());
        };

        let mut attempt = 1;
        loop {
            match self.update_in_transaction(id, query, update).await {
                Err(AppError::Database(e)) if attempt < MAX_TRANSACTION_ATTEMPTS => {
                    tracing::warn!(
                        collection = self.name,
                        id,
                        attempt,
                        error = %e,
                        "Update transaction failed, retrying"
                    );
                    tokio::time::sleep(TRANSACTION_RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn update_in_transaction(
        &self,
        id: &str,
        query: &Query,
        update: &Update,
    ) -> Result<UpdateResult, AppError> {
        let client = &self.db.client;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Reads through this handle are registered with the transaction
        let reader = client.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );
        let raw: Option<Value> = reader
            .fluent()
            .select()
            .by_id_in(self.name)
            .obj::<Value>()
            .one(id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read document in transaction: {}", e))
            })?;

        let Some((doc_id, mut body)) = raw
            .and_then(|doc| self.normalize(doc, Some(id)))
            .filter(|(doc_id, body)| query.matches(doc_id, body))
        else {
            let _ = transaction.rollback().await;
            return Ok(UpdateResult::unmatched());
        };

        let changed = match update.apply(&mut body) {
            Ok(changed) => changed,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(e);
            }
        };
        if !changed {
            let _ = transaction.rollback().await;
            return Ok(UpdateResult::matched(false));
        }

        client
            .fluent()
            .update()
            .in_col(self.name)
            .document_id(&doc_id)
            .object(&Value::Object(body))
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add update to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(collection = self.name, id = %doc_id, "Document updated");
        Ok(UpdateResult::matched(true))
    }

    /// Create a document. Fails with `DuplicateKey` if the id is taken.
    pub async fn insert_one(&self, document: Document) -> Result<InsertOneResult, AppError> {
        let (id, body) = query::split_id(document)?;

        let _: () = self
            .db
            .client
            .fluent()
            .insert()
            .into(self.name)
            .document_id(&id)
            .object(&Value::Object(body))
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => AppError::DuplicateKey(id.clone()),
                other => AppError::Database(other.to_string()),
            })?;

        Ok(InsertOneResult { inserted_id: id })
    }

    pub async fn count_documents(&self, query: &Query) -> Result<u64, AppError> {
        Ok(self.find(query).await?.len() as u64)
    }

    /// Whether the collection holds no documents (reads at most one).
    pub async fn is_empty(&self) -> Result<bool, AppError> {
        let docs: Vec<Value> = self
            .db
            .client
            .fluent()
            .select()
            .from(self.name)
            .limit(1)
            .obj::<Value>()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(docs.is_empty())
    }

    /// Split a raw Firestore object into its id and stored body.
    fn normalize(&self, raw: Value, known_id: Option<&str>) -> Option<(String, Document)> {
        let Value::Object(mut body) = raw else {
            tracing::warn!(collection = self.name, "Skipping non-object document");
            return None;
        };

        let id = match body.remove(FIRESTORE_ID_FIELD) {
            Some(Value::String(id)) => id,
            _ => known_id?.to_string(),
        };
        body.retain(|field, _| !field.starts_with(FIRESTORE_META_PREFIX));
        body.remove(query::ID_FIELD);

        Some((id, body))
    }
}
