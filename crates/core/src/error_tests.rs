// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    invalid_action = { Error::InvalidAction("upsert".into()), "upsert" },
    invalid_entity_type = { Error::InvalidEntityType("".into()), "entity type" },
    invalid_payload = { Error::InvalidPayload("missing id".into()), "missing id" },
    invalid_timestamp = { Error::InvalidTimestamp("yesterday".into()), "yesterday" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn invalid_action_lists_valid_actions() {
    let msg = Error::InvalidAction("patch".into()).to_string();
    assert!(msg.contains("create, update, delete"));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
