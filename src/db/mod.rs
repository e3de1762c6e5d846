// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer with Firestore and in-memory backends.
//!
//! [`Database`] owns the backend binding. It starts unresolved; the first
//! collection request tries Firestore (bounded by the configured timeout),
//! falls back to in-memory storage on any failure, and seeds empty
//! collections. That transition happens once per `Database` and is never
//! revisited.

pub mod firestore;
pub mod memory;
pub mod query;
pub mod seed;

pub use firestore::{FirestoreCollection, FirestoreDb};
pub use memory::MemoryCollection;
pub use query::{
    Document, Filter, InsertOneResult, Query, QueryError, Update, UpdateOp, UpdateResult, ID_FIELD,
};
pub use seed::{PreparedSeed, SeedData, SeedReport};

use crate::config::Config;
use crate::error::AppError;
use futures_util::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio::sync::OnceCell;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
    pub const TEACHERS: &str = "teachers";
}

/// Which storage the process is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Firestore answered within the timeout.
    Live,
    /// In-memory storage; contents are lost on restart.
    Fallback,
}

/// Collection handle with the same contract in both modes.
#[derive(Clone)]
pub enum Collection {
    Firestore(FirestoreCollection),
    Memory(MemoryCollection),
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Firestore(c) => c.name(),
            Collection::Memory(c) => c.name(),
        }
    }

    pub async fn find(&self, query: &Query) -> Result<Vec<Document>, AppError> {
        match self {
            Collection::Firestore(c) => c.find(query).await,
            Collection::Memory(c) => Ok(c.find(query)),
        }
    }

    pub async fn find_one(&self, query: &Query) -> Result<Option<Document>, AppError> {
        match self {
            Collection::Firestore(c) => c.find_one(query).await,
            Collection::Memory(c) => Ok(c.find_one(query)),
        }
    }

    pub async fn update_one(
        &self,
        query: &Query,
        update: &Update,
    ) -> Result<UpdateResult, AppError> {
        match self {
            Collection::Firestore(c) => c.update_one(query, update).await,
            Collection::Memory(c) => c.update_one(query, update),
        }
    }

    pub async fn insert_one(&self, document: Document) -> Result<InsertOneResult, AppError> {
        match self {
            Collection::Firestore(c) => c.insert_one(document).await,
            Collection::Memory(c) => c.insert_one(document),
        }
    }

    pub async fn count_documents(&self, query: &Query) -> Result<u64, AppError> {
        match self {
            Collection::Firestore(c) => c.count_documents(query).await,
            Collection::Memory(c) => Ok(c.count_documents(query)),
        }
    }

    pub async fn is_empty(&self) -> Result<bool, AppError> {
        match self {
            Collection::Firestore(c) => c.is_empty().await,
            Collection::Memory(c) => Ok(c.is_empty()),
        }
    }
}

/// A resolved binding: the mode plus both collection handles.
#[derive(Clone)]
pub struct Backend {
    mode: BackendMode,
    activities: Collection,
    teachers: Collection,
}

impl Backend {
    /// Bind to Firestore's native collections.
    pub fn live(db: &FirestoreDb) -> Self {
        Self {
            mode: BackendMode::Live,
            activities: Collection::Firestore(db.collection(collections::ACTIVITIES)),
            teachers: Collection::Firestore(db.collection(collections::TEACHERS)),
        }
    }

    /// Bind to two fresh, independent in-memory collections.
    pub fn memory() -> Self {
        Self {
            mode: BackendMode::Fallback,
            activities: Collection::Memory(MemoryCollection::new(collections::ACTIVITIES)),
            teachers: Collection::Memory(MemoryCollection::new(collections::TEACHERS)),
        }
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    pub fn activities(&self) -> &Collection {
        &self.activities
    }

    pub fn teachers(&self) -> &Collection {
        &self.teachers
    }
}

/// Function used to reach the live database.
pub type Connector = Box<dyn Fn() -> BoxFuture<'static, Result<FirestoreDb, AppError>> + Send + Sync>;

/// Owned backend state. Share it behind an `Arc`.
pub struct Database {
    config: Config,
    connector: Connector,
    backend: OnceCell<Backend>,
}

impl Database {
    /// Database that will try Firestore for `config.gcp_project_id`.
    pub fn new(config: Config) -> Self {
        let project_id = config.gcp_project_id.clone();
        Self::with_connector(config, move || {
            let project_id = project_id.clone();
            async move { FirestoreDb::connect(&project_id).await }
        })
    }

    /// Database with a custom way of reaching Firestore.
    pub fn with_connector<F, Fut>(config: Config, connect: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FirestoreDb, AppError>> + Send + 'static,
    {
        Self {
            config,
            connector: Box::new(move || connect().boxed()),
            backend: OnceCell::new(),
        }
    }

    /// Database that never tries Firestore.
    pub fn in_memory(config: Config) -> Self {
        Self::with_connector(config, || async {
            Err(AppError::Database("in-memory storage requested".to_string()))
        })
    }

    /// The resolved mode, or `None` before the first collection request.
    pub fn mode(&self) -> Option<BackendMode> {
        self.backend.get().map(Backend::mode)
    }

    /// Resolve and seed the backend on first use.
    ///
    /// Concurrent first callers wait on a single initialization. A seeding
    /// failure is returned and the next call retries from scratch.
    pub async fn backend(&self) -> Result<&Backend, AppError> {
        self.backend.get_or_try_init(|| self.initialize()).await
    }

    pub async fn get_activities_collection(&self) -> Result<Collection, AppError> {
        Ok(self.backend().await?.activities().clone())
    }

    pub async fn get_teachers_collection(&self) -> Result<Collection, AppError> {
        Ok(self.backend().await?.teachers().clone())
    }

    async fn initialize(&self) -> Result<Backend, AppError> {
        let seed = match &self.config.seed_data_path {
            Some(path) => SeedData::load_from_file(path)?,
            None => SeedData::default_catalog()?,
        };
        // Password hashing is CPU-bound.
        let prepared = tokio::task::spawn_blocking(move || seed.prepare())
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        let backend = self.select_backend().await;
        let report = seed::ensure_seeded(&backend, &prepared).await?;

        tracing::info!(
            mode = ?backend.mode(),
            activities_seeded = report.activities_inserted,
            teachers_seeded = report.teachers_inserted,
            "Storage backend ready"
        );
        Ok(backend)
    }

    async fn select_backend(&self) -> Backend {
        let timeout = self.config.connect_timeout();
        match tokio::time::timeout(timeout, (self.connector)()).await {
            Ok(Ok(db)) => Backend::live(&db),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Firestore not available, using in-memory storage");
                Backend::memory()
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.connect_timeout_ms,
                    "Firestore connection timed out, using in-memory storage"
                );
                Backend::memory()
            }
        }
    }
}
