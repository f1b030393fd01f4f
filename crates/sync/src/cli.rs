// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use ft_core::{Action, EntityType};

/// Parse a mutation action (create, update, delete).
fn parse_action(s: &str) -> Result<Action, String> {
    Action::from_str(s).map_err(|e| e.to_string())
}

/// Parse an entity type tag; unknown tags are accepted verbatim.
fn parse_entity_type(s: &str) -> Result<EntityType, String> {
    EntityType::from_str(s).map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "ftsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first mutation queue for the fintrack record store")]
#[command(
    long_about = "Offline-first mutation queue for the fintrack record store.\n\n\
    Mutations are persisted locally and replayed in order against the remote \
    record store whenever it is reachable."
)]
pub struct Cli {
    /// Directory holding the queue and config.toml
    #[arg(long, global = true, value_name = "dir")]
    pub state_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Queue a mutation for sync
    #[command(after_help = "\
Examples:
  ftsync enqueue create transaction '{\"id\":\"t1\",\"amount\":1500}'
  ftsync enqueue update card '{\"id\":\"c1\",\"limit\":500}'
  ftsync enqueue delete card c1")]
    Enqueue {
        /// create, update or delete
        #[arg(value_parser = parse_action)]
        action: Action,

        /// Entity type (transaction, payment, card, note, budget, ...)
        #[arg(value_parser = parse_entity_type, value_name = "TYPE")]
        entity_type: EntityType,

        /// Entity as JSON; for deletes a bare id is accepted
        payload: String,
    },

    /// Show queue and connectivity status
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// List pending mutations in dispatch order
    List {
        /// Print the queue as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay the queue against the remote once and exit
    Sync,

    /// Discard every pending mutation
    Clear,

    /// Keep syncing until interrupted, queueing JSON mutations read from stdin
    #[command(after_help = "\
Each stdin line is one mutation:
  {\"action\":\"create\",\"type\":\"note\",\"data\":{\"id\":\"n1\",\"body\":\"hi\"}}")]
    Run,
}
