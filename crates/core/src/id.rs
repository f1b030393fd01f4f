// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};

use crate::mutation::{Action, EntityType};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate a queue item ID from the mutation and its enqueue time.
/// Format: {enqueued_at_ms}-{hash} where hash is the first 8 hex chars of
/// SHA256(type + action + timestamp + pid + sequence).
///
/// The per-process sequence keeps IDs unique for mutations enqueued in the
/// same millisecond; the pid keeps them unique across restarts.
pub fn generate_item_id(entity_type: &EntityType, action: Action, enqueued_at_ms: i64) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let input = format!(
        "{}{}{}{}{}",
        entity_type,
        action,
        enqueued_at_ms,
        std::process::id(),
        seq
    );
    let hash = Sha256::digest(input.as_bytes());
    format!("{}-{}", enqueued_at_ms, hex::encode(&hash[..4]))
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
