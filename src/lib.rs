// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mergington Directory: persistence for the school activities catalog
//!
//! Activities and staff accounts live in Firestore when it is reachable and
//! in process memory otherwise. Callers get the same collection contract in
//! both cases through [`db::Database`].

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use db::{BackendMode, Collection, Database, Query, Update};
pub use error::{AppError, Result};
