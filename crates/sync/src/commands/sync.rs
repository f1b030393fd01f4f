// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Commands that talk to the remote.

use ft_core::{Action, EntityType, QueueItem, SyncFailure, SyncStatus};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::Context;
use crate::error::{Error, Result};
use crate::sync::{SyncObserver, SyncOrchestrator};

/// Replays the queue once, then exits.
pub async fn once(ctx: &Context) -> Result<()> {
    let engine = ctx.remote_engine().await?;
    let orchestrator = &engine.orchestrator;
    let before = orchestrator.status().queue_size;

    let status = if orchestrator.connectivity().is_online() {
        orchestrator.force_sync_now().await
    } else {
        orchestrator.status()
    };
    engine.shutdown().await;

    println!("{}", summarize(before, &status));
    for failure in &status.errors {
        println!("  {}", failure);
    }
    Ok(())
}

/// Syncs until Ctrl-C, queueing mutations read from stdin.
pub async fn run(ctx: &Context) -> Result<()> {
    let engine = ctx.remote_engine().await?;
    engine.orchestrator.subscribe(DropReporter);
    info!(
        "syncing {} pending mutation(s); Ctrl-C to stop",
        engine.orchestrator.status().queue_size
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => {
                    if let Err(e) = enqueue_line(&engine.orchestrator, &line) {
                        warn!("ignoring input line: {}", e);
                    }
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("stdin closed: {}", e);
                    stdin_open = false;
                }
            },
        }
    }

    let remaining = engine.orchestrator.status().queue_size;
    engine.shutdown().await;
    info!("stopped with {} mutation(s) still queued", remaining);
    Ok(())
}

/// One mutation per stdin line, in the queue file's field names.
#[derive(Debug, Deserialize)]
pub(crate) struct MutationLine {
    pub action: Action,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(default)]
    pub data: Value,
}

pub(crate) fn parse_line(line: &str) -> Result<Option<MutationLine>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| Error::InvalidPayload(e.to_string()))
}

fn enqueue_line(orchestrator: &SyncOrchestrator, line: &str) -> Result<()> {
    let Some(mutation) = parse_line(line)? else {
        return Ok(());
    };
    let id = orchestrator.enqueue(mutation.action, mutation.entity_type, mutation.data)?;
    println!("{}", id);
    Ok(())
}

pub(crate) fn summarize(before: usize, status: &SyncStatus) -> String {
    if !status.is_online {
        return format!(
            "Remote unreachable; {} mutation(s) still queued",
            status.queue_size
        );
    }
    let sent = before.saturating_sub(status.queue_size);
    if status.queue_size == 0 {
        format!("Synced {} mutation(s)", sent)
    } else {
        format!(
            "Synced {} mutation(s); {} still queued",
            sent, status.queue_size
        )
    }
}

/// Prints every mutation the engine gives up on.
struct DropReporter;

impl SyncObserver for DropReporter {
    fn on_status(&self, _status: &SyncStatus) {}

    fn on_dropped(&self, _item: &QueueItem, failure: &SyncFailure) {
        println!("dropped: {}", failure);
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
