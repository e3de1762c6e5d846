// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by both storage backends.

use crate::db::query::QueryError;
use crate::db::seed::SeedError;

/// Application error type.
///
/// Live and in-memory collections report failures through the same
/// variants so callers cannot tell the backends apart structurally.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Document with _id {0:?} already exists")]
    DuplicateKey(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Seeding failed: {0}")]
    Seed(#[from] SeedError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether this error came from the database driver rather than from
    /// the caller's input.
    pub fn is_database_error(&self) -> bool {
        matches!(self, AppError::Database(_))
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
