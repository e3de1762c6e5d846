// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Staff password hashing.
//!
//! Credentials are Argon2id PHC strings with a fresh random salt per call,
//! so hashing the same password twice yields different strings. Only
//! [`verify_password`] can compare a plaintext against one.

use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password.
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Hashing(e.to_string()))
}

/// Verify a plaintext password against a stored credential.
///
/// Returns `Ok(false)` on mismatch and an error only if the credential is
/// not a parseable hash.
pub fn verify_password(plaintext: &str, credential: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(credential).map_err(|e| AppError::Hashing(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}
