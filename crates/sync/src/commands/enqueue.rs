// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ft_core::{Action, EntityType};
use serde_json::Value;

use super::Context;
use crate::error::{Error, Result};

pub async fn run(
    ctx: &Context,
    action: Action,
    entity_type: EntityType,
    payload: &str,
) -> Result<()> {
    let payload = parse_payload(action, payload)?;
    let orchestrator = ctx.local_orchestrator()?;
    let id = orchestrator.enqueue(action, entity_type, payload);
    orchestrator.shutdown().await;

    println!("{}", id?);
    Ok(())
}

/// Parses the payload argument.
///
/// Deletes also accept a bare entity id that is not valid JSON.
pub(crate) fn parse_payload(action: Action, raw: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Ok(value),
        Err(_) if action == Action::Delete && !raw.trim().is_empty() => {
            Ok(Value::String(raw.trim().to_string()))
        }
        Err(e) => Err(Error::InvalidPayload(e.to_string())),
    }
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
