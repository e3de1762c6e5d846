// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Extracurricular activity model.
//!
//! Stored in the `activities` collection with the activity name as the
//! document identity. The name itself is not repeated inside the body.

use crate::db::query::{self, Document};
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Stored activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Free-form description
    pub description: String,
    /// Human-readable schedule ("Mondays and Fridays, 3:15 PM - 4:45 PM")
    pub schedule: String,
    /// Structured schedule used for day/time filtering
    pub schedule_details: ScheduleDetails,
    /// Capacity. Not enforced by the storage layer.
    pub max_participants: u32,
    /// Enrolled student emails, in enrollment order
    #[serde(default)]
    pub participants: Vec<String>,
    /// Difficulty tier. Omitted from the document entirely when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// Weekly meeting pattern.
///
/// Times are 24h "HH:MM" strings so they order correctly as plain strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDetails {
    pub days: Vec<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Activity {
    /// Whether enrollment has reached capacity.
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }

    /// Build the document to insert, with `name` as its identity.
    pub fn to_document(&self, name: &str) -> Result<Document, AppError> {
        let body = super::to_document(self)?;
        Ok(query::with_id(name, &body))
    }

    /// Parse a returned document into `(name, activity)`.
    pub fn from_document(doc: Document) -> Result<(String, Self), AppError> {
        let name = doc
            .get(query::ID_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("activity document without _id")))?
            .to_string();
        Ok((name, super::from_document(doc)?))
    }
}
