// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ft-core operations.

use thiserror::Error;

/// All possible errors that can occur in ft-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid action: '{0}'\n  hint: valid actions are: create, update, delete")]
    InvalidAction(String),

    #[error("invalid entity type: '{0}'\n  hint: entity types are non-empty tags such as transaction, payment, card, note, budget")]
    InvalidEntityType(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for ft-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
