// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued mutations.
//!
//! Every local change to a financial record is represented as a
//! [`QueueItem`]: an action against one entity of a given type, carrying the
//! entity data. Items are persisted in insertion order and applied to the
//! remote store one at a time.
//!
//! Persisted field names match the durable queue format:
//! `id`, `action`, `type`, `data`, `timestamp`, `retryCount`, `lastError`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// The kind of change a mutation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    /// All actions, in declaration order.
    pub const ALL: [Action; 3] = [Action::Create, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Returns true for actions that write the entity (create and update).
    pub fn is_write(&self) -> bool {
        matches!(self, Action::Create | Action::Update)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            _ => Err(Error::InvalidAction(s.to_string())),
        }
    }
}

/// Domain category of the entity a mutation targets.
///
/// Determines which remote handler the mutation is dispatched to. Tags the
/// engine does not know about are kept verbatim in [`EntityType::Other`] so
/// they survive a round trip through the durable queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Transaction,
    Payment,
    Card,
    Note,
    Budget,
    Other(String),
}

impl EntityType {
    /// The entity types with a well-known remote collection.
    pub const KNOWN: [EntityType; 5] = [
        EntityType::Transaction,
        EntityType::Payment,
        EntityType::Card,
        EntityType::Note,
        EntityType::Budget,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Transaction => "transaction",
            EntityType::Payment => "payment",
            EntityType::Card => "card",
            EntityType::Note => "note",
            EntityType::Budget => "budget",
            EntityType::Other(tag) => tag,
        }
    }
}

impl From<String> for EntityType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "transaction" => EntityType::Transaction,
            "payment" => EntityType::Payment,
            "card" => EntityType::Card,
            "note" => EntityType::Note,
            "budget" => EntityType::Budget,
            _ => EntityType::Other(tag),
        }
    }
}

impl From<EntityType> for String {
    fn from(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim();
        if tag.is_empty() {
            return Err(Error::InvalidEntityType(s.to_string()));
        }
        Ok(EntityType::from(tag.to_lowercase()))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single pending mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Unique identifier generated at enqueue time.
    pub id: String,
    pub action: Action,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Entity data. For deletes, at minimum the entity id.
    #[serde(rename = "data")]
    pub payload: Value,
    /// Enqueue time in milliseconds since Unix epoch.
    #[serde(rename = "timestamp")]
    pub enqueued_at: i64,
    /// Attempts that have failed so far.
    #[serde(default)]
    pub retry_count: u32,
    /// Last failure reason, for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl QueueItem {
    /// Creates a fresh item with no recorded failures.
    pub fn new(
        id: String,
        action: Action,
        entity_type: EntityType,
        payload: Value,
        enqueued_at: i64,
    ) -> Self {
        QueueItem {
            id,
            action,
            entity_type,
            payload,
            enqueued_at,
            retry_count: 0,
            last_error: None,
        }
    }

    /// Returns the id of the targeted entity.
    ///
    /// Accepts either an object payload with an `id` field (string or
    /// number) or a bare string payload, which is how deletes are often
    /// queued.
    pub fn entity_id(&self) -> Option<String> {
        let id = match &self.payload {
            Value::Object(map) => map.get("id")?,
            other => other,
        };
        match id {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Records a failed attempt and returns the new retry count.
    pub fn record_failure(&mut self, reason: impl Into<String>) -> u32 {
        self.retry_count = self.retry_count.saturating_add(1);
        self.last_error = Some(reason.into());
        self.retry_count
    }

    /// Milliseconds elapsed since the item was enqueued.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.enqueued_at).max(0)
    }

    /// Short human-readable label, e.g. `create transaction 1700000-ab12cd34`.
    pub fn describe(&self) -> String {
        format!("{} {} {}", self.action, self.entity_type, self.id)
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
