// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::StoreError;

/// All possible errors that can occur in the ftsync library.
///
/// Ordinary sync failures (unreachable remote, rejected writes, missing
/// identity) never surface here: they are recorded on the queue and exposed
/// through the sync status. These are local failures only.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("queue store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Core(#[from] ft_core::Error),

    #[error("invalid payload: {0}\n  hint: pass the entity as a JSON object, e.g. '{{\"id\":\"t1\",\"amount\":1500}}'")]
    InvalidPayload(String),

    #[error("no remote configured\n  hint: add a [remote] section with url = \"ws://host:port\" to {0}")]
    NoRemote(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ftsync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
