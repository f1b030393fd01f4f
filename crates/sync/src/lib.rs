// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ftsync - offline-first mutation queue for the fintrack record store.
//!
//! Local changes are queued durably and replayed in order against the remote
//! record store whenever it is reachable. The engine lives in [`sync`]; the
//! rest of this crate is the `ftsync` command-line host around it.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ft_core::{Action, EntityType, SessionIdentity};
//! use ftsync::sync::*;
//!
//! let remote = Arc::new(WebSocketRemote::new(url, Duration::from_secs(10)));
//! let processor = MutationProcessor::new(
//!     DispatchTable::for_remote(remote, &EntityType::KNOWN),
//!     Arc::new(SessionIdentity::with_session("user-1")),
//! );
//! let orchestrator = SyncOrchestrator::builder(
//!     FileQueueStore::in_dir(&state_dir)?,
//!     Arc::new(ConnectivityMonitor::new(true)),
//!     processor,
//! )
//! .start();
//!
//! orchestrator.enqueue(Action::Create, EntityType::Transaction, payload)?;
//! ```

mod cli;
mod commands;

pub mod config;
pub mod env;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{Error, Result};

use commands::Context;
use tracing_subscriber::EnvFilter;

/// Runs one CLI invocation.
pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.state_dir.as_deref())?;

    match cli.command {
        Command::Enqueue {
            action,
            entity_type,
            payload,
        } => commands::enqueue::run(&ctx, action, entity_type, &payload).await,
        Command::Status { json } => commands::status::run(&ctx, json).await,
        Command::List { json } => commands::queue::list(&ctx, json),
        Command::Sync => commands::sync::once(&ctx).await,
        Command::Clear => commands::queue::clear(&ctx).await,
        Command::Run => commands::sync::run(&ctx).await,
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` controls the filter; `verbose` forces `debug`.
pub fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
