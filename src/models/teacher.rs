// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Staff account model.

use crate::db::query::{self, Document};
use crate::error::AppError;
use crate::services::password;
use serde::{Deserialize, Serialize};

/// Stored staff account, keyed by `username`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub username: String,
    pub display_name: String,
    /// Argon2 PHC string. Never the plaintext.
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Admin,
}

/// Staff entry as it appears in seed data, with a plaintext password.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedTeacher {
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub role: Role,
}

impl SeedTeacher {
    /// Replace the plaintext password with its hashed credential.
    pub fn into_teacher(self) -> Result<Teacher, AppError> {
        Ok(Teacher {
            password: password::hash_password(&self.password)?,
            username: self.username,
            display_name: self.display_name,
            role: self.role,
        })
    }
}

impl Teacher {
    /// Build the document to insert, identified by username.
    pub fn to_document(&self) -> Result<Document, AppError> {
        let body = super::to_document(self)?;
        Ok(query::with_id(&self.username, &body))
    }

    pub fn from_document(doc: Document) -> Result<Self, AppError> {
        super::from_document(doc)
    }

    /// Check a plaintext password against the stored credential.
    pub fn verify_password(&self, plaintext: &str) -> bool {
        password::verify_password(plaintext, &self.password).unwrap_or(false)
    }
}
