// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for talking to a remote record store.
//!
//! The protocol is request/response:
//! - Client sends one upsert or delete, tagged with a request id
//! - Server answers with an ack, a rejection, or a version conflict carrying
//!   its current copy of the record

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mutation::EntityType;

/// How an upsert treats a diverged remote record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Fail with a conflict if the remote copy changed underneath us.
    #[default]
    Checked,
    /// Replace the remote copy unconditionally (used after resolution).
    Overwrite,
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create or replace one record.
    Upsert {
        request_id: u64,
        user_id: String,
        entity_type: EntityType,
        entity: Value,
        #[serde(default)]
        mode: WriteMode,
    },

    /// Delete one record by id.
    Delete {
        request_id: u64,
        user_id: String,
        entity_type: EntityType,
        entity_id: String,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The request was applied.
    Ack { request_id: u64 },

    /// The request was refused (validation, permissions).
    Rejected { request_id: u64, reason: String },

    /// A checked upsert hit a newer remote version.
    Conflict {
        request_id: u64,
        /// The server's current copy of the record.
        remote: Value,
    },

    /// Error not tied to a request.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates an Upsert message.
    pub fn upsert(
        request_id: u64,
        user_id: impl Into<String>,
        entity_type: EntityType,
        entity: Value,
        mode: WriteMode,
    ) -> Self {
        ClientMessage::Upsert {
            request_id,
            user_id: user_id.into(),
            entity_type,
            entity,
            mode,
        }
    }

    /// Creates a Delete message.
    pub fn delete(
        request_id: u64,
        user_id: impl Into<String>,
        entity_type: EntityType,
        entity_id: impl Into<String>,
    ) -> Self {
        ClientMessage::Delete {
            request_id,
            user_id: user_id.into(),
            entity_type,
            entity_id: entity_id.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates an Ack message.
    pub fn ack(request_id: u64) -> Self {
        ServerMessage::Ack { request_id }
    }

    /// Creates a Rejected message.
    pub fn rejected(request_id: u64, reason: impl Into<String>) -> Self {
        ServerMessage::Rejected {
            request_id,
            reason: reason.into(),
        }
    }

    /// Creates a Conflict message.
    pub fn conflict(request_id: u64, remote: Value) -> Self {
        ServerMessage::Conflict { request_id, remote }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Returns the request this message answers, if any.
    pub fn request_id(&self) -> Option<u64> {
        match self {
            ServerMessage::Ack { request_id }
            | ServerMessage::Rejected { request_id, .. }
            | ServerMessage::Conflict { request_id, .. } => Some(*request_id),
            ServerMessage::Error { .. } => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
