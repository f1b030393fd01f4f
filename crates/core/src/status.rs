// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Derived sync status published to observers.
//!
//! Never persisted: recomputed from the live queue on every mutation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mutation::{Action, EntityType, QueueItem};

/// A failure attributed to one queued mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub item_id: String,
    pub action: Action,
    pub entity_type: EntityType,
    pub message: String,
    /// Failed attempts so far.
    pub attempts: u32,
    /// True once the mutation was removed from the queue without being applied.
    pub dropped: bool,
}

impl SyncFailure {
    pub fn for_item(item: &QueueItem, message: impl Into<String>) -> Self {
        SyncFailure {
            item_id: item.id.clone(),
            action: item.action,
            entity_type: item.entity_type.clone(),
            message: message.into(),
            attempts: item.retry_count,
            dropped: false,
        }
    }

    pub fn dropped(mut self) -> Self {
        self.dropped = true;
        self
    }
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.action, self.entity_type, self.item_id, self.message
        )?;
        if self.dropped {
            write!(f, " (dropped after {} attempts)", self.attempts)?;
        }
        Ok(())
    }
}

/// Snapshot of the sync engine's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_online: bool,
    pub is_syncing: bool,
    pub queue_size: usize,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub errors: Vec<SyncFailure>,
}

impl SyncStatus {
    /// True when any mutation has failed or been dropped.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Mutations removed without being applied.
    pub fn dropped(&self) -> impl Iterator<Item = &SyncFailure> {
        self.errors.iter().filter(|e| e.dropped)
    }

    /// True when there is nothing left to send and nothing has failed.
    pub fn is_settled(&self) -> bool {
        self.queue_size == 0 && self.errors.is_empty() && !self.is_syncing
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
