// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ft_core::{
    Action, EntityType, ManualClock, QueueItem, SessionIdentity, SyncFailure, SyncStatus,
    WriteMode,
};
use serde_json::{json, Value};

use super::connectivity::ConnectivityMonitor;
use super::observer::SyncObserver;
use super::orchestrator::{OrchestratorConfig, SyncOrchestrator};
use super::processor::{DispatchTable, MutationProcessor};
use super::queue::MemoryQueueStore;
use super::remote::{RemoteError, RemoteFuture, RemoteStore};

/// Fixed start time for manual clocks (2023-11-14T22:13:20Z).
pub const T0: i64 = 1_700_000_000_000;

/// Create a queue item with an object payload carrying `id`.
pub fn make_item(id: &str, action: Action, entity_type: EntityType, ts: i64) -> QueueItem {
    QueueItem::new(
        id.to_string(),
        action,
        entity_type,
        json!({ "id": format!("e-{}", id) }),
        ts,
    )
}

/// One call observed by [`FakeRemote`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Upsert {
        user_id: String,
        entity_type: EntityType,
        entity: Value,
        mode: WriteMode,
    },
    Delete {
        user_id: String,
        entity_type: EntityType,
        entity_id: String,
    },
}

impl RemoteCall {
    pub fn entity_type(&self) -> &EntityType {
        match self {
            RemoteCall::Upsert { entity_type, .. } | RemoteCall::Delete { entity_type, .. } => {
                entity_type
            }
        }
    }

    pub fn mode(&self) -> Option<WriteMode> {
        match self {
            RemoteCall::Upsert { mode, .. } => Some(*mode),
            RemoteCall::Delete { .. } => None,
        }
    }
}

/// In-memory remote store with scripted failures.
#[derive(Default)]
pub struct FakeRemote {
    calls: Mutex<Vec<RemoteCall>>,
    records: Mutex<HashMap<(String, String), Value>>,
    scripted: Mutex<VecDeque<RemoteError>>,
    always: Mutex<Option<RemoteError>>,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fails the next `n` calls with `err`.
    pub fn fail_next(&self, n: usize, err: RemoteError) {
        let mut scripted = self.scripted.lock().unwrap();
        for _ in 0..n {
            scripted.push_back(err.clone());
        }
    }

    /// Answers the next call with a version conflict carrying `remote`.
    pub fn conflict_next(&self, remote: Value) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(RemoteError::Conflict { remote });
    }

    /// Fails every call with `err` until cleared with `None`.
    pub fn fail_always(&self, err: Option<RemoteError>) {
        *self.always.lock().unwrap() = err;
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn record(&self, entity_type: &str, id: &str) -> Option<Value> {
        self.records
            .lock()
            .unwrap()
            .get(&(entity_type.to_string(), id.to_string()))
            .cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Highest number of calls observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn handle(&self, call: RemoteCall) -> Result<(), RemoteError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.calls.lock().unwrap().push(call.clone());

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let scripted = self.scripted.lock().unwrap().pop_front();
        let failure = scripted.or_else(|| self.always.lock().unwrap().clone());
        let result = match failure {
            Some(err) => Err(err),
            None => {
                self.apply(call);
                Ok(())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn apply(&self, call: RemoteCall) {
        let mut records = self.records.lock().unwrap();
        match call {
            RemoteCall::Upsert {
                entity_type,
                entity,
                ..
            } => {
                let id = entity
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                records.insert((entity_type.to_string(), id), entity);
            }
            RemoteCall::Delete {
                entity_type,
                entity_id,
                ..
            } => {
                records.remove(&(entity_type.to_string(), entity_id));
            }
        }
    }
}

impl RemoteStore for FakeRemote {
    fn upsert<'a>(
        &'a self,
        user_id: &'a str,
        entity_type: &'a EntityType,
        entity: &'a Value,
        mode: WriteMode,
    ) -> RemoteFuture<'a> {
        Box::pin(self.handle(RemoteCall::Upsert {
            user_id: user_id.to_string(),
            entity_type: entity_type.clone(),
            entity: entity.clone(),
            mode,
        }))
    }

    fn delete<'a>(
        &'a self,
        user_id: &'a str,
        entity_type: &'a EntityType,
        entity_id: &'a str,
    ) -> RemoteFuture<'a> {
        Box::pin(self.handle(RemoteCall::Delete {
            user_id: user_id.to_string(),
            entity_type: entity_type.clone(),
            entity_id: entity_id.to_string(),
        }))
    }
}

/// Processor routing every known entity type to `remote` as `user-1`.
pub fn processor_for(remote: &Arc<FakeRemote>) -> MutationProcessor {
    MutationProcessor::new(
        DispatchTable::for_remote(Arc::clone(remote), &EntityType::KNOWN),
        Arc::new(SessionIdentity::with_session("user-1")),
    )
}

/// Observer that records everything it is told.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    statuses: Arc<Mutex<Vec<SyncStatus>>>,
    dropped: Arc<Mutex<Vec<(QueueItem, SyncFailure)>>>,
}

impl RecordingObserver {
    pub fn statuses(&self) -> Vec<SyncStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn dropped(&self) -> Vec<(QueueItem, SyncFailure)> {
        self.dropped.lock().unwrap().clone()
    }
}

impl SyncObserver for RecordingObserver {
    fn on_status(&self, status: &SyncStatus) {
        self.statuses.lock().unwrap().push(status.clone());
    }

    fn on_dropped(&self, item: &QueueItem, failure: &SyncFailure) {
        self.dropped
            .lock()
            .unwrap()
            .push((item.clone(), failure.clone()));
    }
}

/// An orchestrator wired to in-memory collaborators.
pub struct Harness {
    pub orchestrator: SyncOrchestrator,
    pub remote: Arc<FakeRemote>,
    pub store: Arc<MemoryQueueStore>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub clock: Arc<ManualClock>,
}

pub fn harness(online: bool) -> Harness {
    harness_with(online, OrchestratorConfig::default(), Vec::new())
}

pub fn harness_with(online: bool, config: OrchestratorConfig, items: Vec<QueueItem>) -> Harness {
    let remote = FakeRemote::new();
    let store = Arc::new(MemoryQueueStore::with_items(items));
    let connectivity = Arc::new(ConnectivityMonitor::new(online));
    let clock = Arc::new(ManualClock::new(T0));

    let orchestrator = SyncOrchestrator::builder(
        Arc::clone(&store),
        Arc::clone(&connectivity),
        processor_for(&remote),
    )
    .clock(Arc::clone(&clock))
    .config(config)
    .start();

    Harness {
        orchestrator,
        remote,
        store,
        connectivity,
        clock,
    }
}

/// Polls `cond` until it holds, failing the test after a generous timeout.
///
/// Under a paused clock the sleeps auto-advance, so this costs no real time.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}
