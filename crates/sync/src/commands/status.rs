// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ft_core::{QueueItem, SyncFailure, SyncStatus};

use super::Context;
use crate::error::Result;
use crate::sync::{probe_address, probe_once, QueueStore};

pub async fn run(ctx: &Context, json: bool) -> Result<()> {
    let items = ctx.open_store()?.load();
    let is_online = match &ctx.config.remote {
        Some(remote) => match probe_address(&remote.url) {
            Some(address) => probe_once(&address, remote.request_timeout()).await,
            None => false,
        },
        None => false,
    };
    let status = persisted_status(&items, is_online);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    print!("{}", render(&status, ctx.config.remote.as_ref().map(|r| r.url.as_str())));
    Ok(())
}

/// Status as far as it can be reconstructed from the persisted queue.
///
/// Failed attempts survive on the items themselves; the last sync time and
/// dropped mutations live only in a running engine.
pub(crate) fn persisted_status(items: &[QueueItem], is_online: bool) -> SyncStatus {
    SyncStatus {
        is_online,
        is_syncing: false,
        queue_size: items.len(),
        last_sync_time: None,
        errors: items
            .iter()
            .filter_map(|item| {
                item.last_error
                    .as_ref()
                    .map(|err| SyncFailure::for_item(item, err.clone()))
            })
            .collect(),
    }
}

pub(crate) fn render(status: &SyncStatus, remote_url: Option<&str>) -> String {
    let mut out = String::new();
    let remote = match remote_url {
        Some(url) if status.is_online => format!("online ({})", url),
        Some(url) => format!("offline ({} unreachable)", url),
        None => "offline (no remote configured)".to_string(),
    };
    out.push_str(&format!("Remote:  {}\n", remote));
    out.push_str(&format!("Pending: {}\n", status.queue_size));
    if let Some(at) = status.last_sync_time {
        out.push_str(&format!("Synced:  {}\n", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if status.has_errors() {
        out.push_str("Errors:\n");
        for failure in &status.errors {
            out.push_str(&format!("  {}\n", failure));
        }
    }
    out
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
