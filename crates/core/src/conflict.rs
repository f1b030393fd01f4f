// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Conflict resolution between local and remote copies of an entity.
//!
//! Resolution rules (last writer wins, metadata preserved):
//! - The record timestamp is `updatedAt`, falling back to `createdAt`
//! - Strictly newer local record: keep local
//! - Strictly newer remote record: keep remote
//! - Equal timestamps: merge. Fields come from local, except `id` and
//!   `createdAt` which come from remote; `updatedAt` is the later of the two
//!
//! Concurrent edits to different fields are not reconciled field by field.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mutation::EntityType;

const UPDATED_AT: &str = "updatedAt";
const CREATED_AT: &str = "createdAt";
/// Fields for which the remote copy is authoritative on merge.
const REMOTE_METADATA: [&str; 2] = ["id", CREATED_AT];

/// Which side of a conflict wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    Local,
    Remote,
    Merge,
    Manual,
}

/// Outcome of resolving one conflict. Consumed immediately, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDecision {
    pub strategy: ConflictStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_data: Option<Value>,
}

impl ConflictDecision {
    pub fn local() -> Self {
        ConflictDecision {
            strategy: ConflictStrategy::Local,
            merged_data: None,
        }
    }

    pub fn remote() -> Self {
        ConflictDecision {
            strategy: ConflictStrategy::Remote,
            merged_data: None,
        }
    }

    pub fn merge(data: Value) -> Self {
        ConflictDecision {
            strategy: ConflictStrategy::Merge,
            merged_data: Some(data),
        }
    }

    pub fn manual() -> Self {
        ConflictDecision {
            strategy: ConflictStrategy::Manual,
            merged_data: None,
        }
    }
}

/// Policy deciding how a version conflict is settled.
pub trait ConflictResolver: Send + Sync {
    fn resolve(&self, local: &Value, remote: &Value, entity_type: &EntityType) -> ConflictDecision;
}

/// Timestamp-based last-writer-wins policy.
#[derive(Debug, Default, Clone, Copy)]
pub struct LastWriterWins;

impl ConflictResolver for LastWriterWins {
    fn resolve(&self, local: &Value, remote: &Value, entity_type: &EntityType) -> ConflictDecision {
        let local_ts = record_time(local);
        let remote_ts = record_time(remote);

        let decision = if local_ts > remote_ts {
            ConflictDecision::local()
        } else if remote_ts > local_ts {
            ConflictDecision::remote()
        } else {
            match merge(local, remote) {
                Some(merged) => ConflictDecision::merge(merged),
                // Scalars cannot be merged field-wise; the local write stands
                None => ConflictDecision::local(),
            }
        };

        tracing::debug!(
            entity_type = %entity_type,
            local_ts,
            remote_ts,
            strategy = ?decision.strategy,
            "resolved conflict"
        );
        decision
    }
}

/// Record timestamp in milliseconds: `updatedAt`, else `createdAt`, else 0.
pub fn record_time(record: &Value) -> i64 {
    record
        .get(UPDATED_AT)
        .and_then(parse_timestamp)
        .or_else(|| record.get(CREATED_AT).and_then(parse_timestamp))
        .unwrap_or(0)
}

/// Parses a timestamp given as integer milliseconds, a numeric string, or
/// an RFC 3339 string.
pub fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().or_else(|| {
            DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.timestamp_millis())
        }),
        _ => None,
    }
}

fn merge(local: &Value, remote: &Value) -> Option<Value> {
    let (Value::Object(local_map), Value::Object(remote_map)) = (local, remote) else {
        return None;
    };

    let mut merged = local_map.clone();
    for key in REMOTE_METADATA {
        if let Some(value) = remote_map.get(key) {
            merged.insert(key.to_string(), value.clone());
        }
    }

    let local_updated = local_map.get(UPDATED_AT);
    let remote_updated = remote_map.get(UPDATED_AT);
    let later = match (local_updated, remote_updated) {
        (Some(l), Some(r)) => {
            let l_ts = parse_timestamp(l).unwrap_or(0);
            let r_ts = parse_timestamp(r).unwrap_or(0);
            Some(if r_ts > l_ts { r } else { l })
        }
        (Some(l), None) => Some(l),
        (None, Some(r)) => Some(r),
        (None, None) => None,
    };
    if let Some(value) = later {
        merged.insert(UPDATED_AT.to_string(), value.clone());
    }

    Some(Value::Object(merged))
}

#[cfg(test)]
#[path = "conflict_tests.rs"]
mod tests;
