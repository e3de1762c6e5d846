// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod teacher;

pub use activity::{Activity, Difficulty, ScheduleDetails};
pub use teacher::{Role, SeedTeacher, Teacher};

use crate::db::query::{self, Document};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Serialize a record into a stored document body (no `_id`).
pub(crate) fn to_document<T: Serialize>(record: &T) -> Result<Document, AppError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::Internal(anyhow::anyhow!(
            "record did not serialize to an object"
        ))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

/// Deserialize a record from a returned document, ignoring `_id`.
pub(crate) fn from_document<T: DeserializeOwned>(mut doc: Document) -> Result<T, AppError> {
    doc.remove(query::ID_FIELD);
    serde_json::from_value(Value::Object(doc)).map_err(|e| AppError::Internal(e.into()))
}
