// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-first mutation sync.
//!
//! Hosts record every local change with [`SyncOrchestrator::enqueue`]. The
//! orchestrator persists it, and a background task replays the queue against
//! the remote store whenever the device is online.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Orchestrator │────►│  Processor  │────►│ RemoteStore │
//! │  (drain task)│◄────│ (dispatch)  │◄────│   (trait)   │
//! └──────────────┘     └─────────────┘     └─────────────┘
//!    │        ▲
//!    ▼        │
//! ┌────────┐ ┌──────────────┐
//! │ Queue  │ │ Connectivity │
//! │ Store  │ │   Monitor    │
//! └────────┘ └──────────────┘
//! ```
//!
//! # Features
//!
//! - Durable FIFO queue stored as one JSON array, rewritten atomically
//! - At most one mutation in flight
//! - Exponential backoff per item, dropped after a fixed number of attempts
//! - Last-writer-wins conflict resolution on explicit remote conflicts
//! - Push-based status updates to subscribed observers
//! - Injectable remote, store, identity and clock for testing

mod connectivity;
mod observer;
mod orchestrator;
mod processor;
mod queue;
mod remote;
mod scheduler;
mod transport;

pub use connectivity::{probe_address, probe_once, ConnectivityMonitor};
pub use observer::{Observers, SubscriptionId, SyncObserver};
pub use orchestrator::{
    OrchestratorBuilder, OrchestratorConfig, SyncOrchestrator, MANUAL_RESOLUTION_REASON,
};
pub use processor::{
    Dispatch, DispatchTable, Handler, MutationProcessor, ProcessError, ProcessOutcome,
};
pub use queue::{
    FileQueueStore, MemoryQueueStore, QueueStore, StoreError, StoreResult, QUEUE_FILE_NAME,
};
pub use remote::{RemoteError, RemoteFuture, RemoteResult, RemoteStore};
pub use scheduler::{RetryDecision, RetryPolicy, RetryScheduler, SchedulerState};
pub use transport::WebSocketRemote;

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod connectivity_tests;





#[cfg(test)]
mod queue_tests;
