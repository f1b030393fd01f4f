// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ft-core: Shared library for the fintrack sync engine
//!
//! This crate provides the data model, conflict policy, identity lookup and
//! wire protocol shared by the `ftsync` engine and its hosts.

pub mod clock;
pub mod conflict;
pub mod error;
pub mod id;
pub mod identity;
pub mod mutation;
pub mod protocol;
pub mod status;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use conflict::{ConflictDecision, ConflictResolver, ConflictStrategy, LastWriterWins};
pub use error::{Error, Result};
pub use identity::{IdentityProvider, SessionIdentity};
pub use mutation::{Action, EntityType, QueueItem};
pub use protocol::{ClientMessage, ServerMessage, WriteMode};
pub use status::{SyncFailure, SyncStatus};
