// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue inspection and maintenance commands.

use ft_core::clock::from_millis;
use ft_core::QueueItem;

use super::Context;
use crate::error::Result;
use crate::sync::QueueStore;

pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let items = ctx.open_store()?.load();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No pending mutations");
        return Ok(());
    }
    for item in &items {
        println!("{}", format_item(item));
    }
    Ok(())
}

pub async fn clear(ctx: &Context) -> Result<()> {
    let orchestrator = ctx.local_orchestrator()?;
    let count = orchestrator.pending_items().len();
    let cleared = orchestrator.clear_queue();
    orchestrator.shutdown().await;
    cleared?;

    println!("Discarded {} pending mutation(s)", count);
    Ok(())
}

pub(crate) fn format_item(item: &QueueItem) -> String {
    let mut line = format!(
        "{}  {:<6}  {:<11}  queued {}",
        item.id,
        item.action.as_str(),
        item.entity_type.as_str(),
        from_millis(item.enqueued_at).format("%Y-%m-%d %H:%M:%S UTC")
    );
    if item.retry_count > 0 {
        line.push_str(&format!("  ({} failed attempt(s)", item.retry_count));
        if let Some(err) = &item.last_error {
            line.push_str(&format!(": {}", err));
        }
        line.push(')');
    }
    line
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
