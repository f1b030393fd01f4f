// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    upsert = { ClientMessage::upsert(1, "u1", EntityType::Transaction, json!({"id": "t1", "amount": 1500}), WriteMode::Checked) },
    overwrite = { ClientMessage::upsert(2, "u1", EntityType::Card, json!({"id": "c1"}), WriteMode::Overwrite) },
    delete = { ClientMessage::delete(3, "u1", EntityType::Card, "c1") },
)]
fn client_message_roundtrip(msg: ClientMessage) {
    let json = msg.to_json().unwrap();
    let parsed = ClientMessage::from_json(&json).unwrap();
    assert_eq!(msg, parsed);
}

#[parameterized(
    ack = { ServerMessage::ack(1) },
    rejected = { ServerMessage::rejected(2, "amount must be positive") },
    conflict = { ServerMessage::conflict(3, json!({"id": "t1", "updatedAt": 10})) },
    error = { ServerMessage::error("boom") },
)]
fn server_message_roundtrip(msg: ServerMessage) {
    let json = msg.to_json().unwrap();
    let parsed = ServerMessage::from_json(&json).unwrap();
    assert_eq!(msg, parsed);
}

#[test]
fn upsert_wire_format() {
    let msg = ClientMessage::upsert(7, "u1", EntityType::Budget, json!({"id": "b1"}), WriteMode::Overwrite);
    let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
    assert_eq!(value["type"], "upsert");
    assert_eq!(value["request_id"], 7);
    assert_eq!(value["entity_type"], "budget");
    assert_eq!(value["mode"], "overwrite");
}

#[test]
fn upsert_mode_defaults_to_checked() {
    let raw = r#"{"type":"upsert","request_id":1,"user_id":"u","entity_type":"note","entity":{}}"#;
    let msg = ClientMessage::from_json(raw).unwrap();
    assert!(matches!(msg, ClientMessage::Upsert { mode: WriteMode::Checked, .. }));
}

#[test]
fn request_id_of_responses() {
    assert_eq!(ServerMessage::ack(5).request_id(), Some(5));
    assert_eq!(ServerMessage::rejected(6, "no").request_id(), Some(6));
    assert_eq!(ServerMessage::conflict(7, json!({})).request_id(), Some(7));
    assert_eq!(ServerMessage::error("x").request_id(), None);
}

#[test]
fn unknown_message_type_fails() {
    assert!(ServerMessage::from_json(r#"{"type":"snapshot"}"#).is_err());
}

#[parameterized(
    ping = { r#"{"type":"ping","id":1}"# },
    pong = { r#"{"type":"pong","id":1}"# },
)]
fn keepalive_messages_are_not_part_of_protocol(raw: &str) {
    assert!(ClientMessage::from_json(raw).is_err());
    assert!(ServerMessage::from_json(raw).is_err());
}
