// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync orchestrator.
//!
//! Owns the in-memory queue and a single background task that drains it.
//! All remote dispatch happens on that task, so at most one mutation is in
//! flight at a time. Host calls (`enqueue`, `clear_queue`, `status`) touch
//! the queue under a short lock that is never held across an await.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ft_core::id::generate_item_id;
use ft_core::{
    Action, ClockSource, ConflictResolver, ConflictStrategy, EntityType, LastWriterWins,
    QueueItem, SyncFailure, SyncStatus, SystemClock,
};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::connectivity::ConnectivityMonitor;
use super::observer::{Observers, SubscriptionId, SyncObserver};
use super::processor::{MutationProcessor, ProcessOutcome};
use super::queue::QueueStore;
use super::scheduler::{RetryDecision, RetryPolicy, RetryScheduler};
use crate::error::Result;

/// Reason recorded when the resolver defers a conflict to the user.
pub const MANUAL_RESOLUTION_REASON: &str = "conflict requires manual resolution";

/// Tunables for the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub retry: RetryPolicy,
    /// How often the queue is drained without any other trigger.
    pub periodic_interval: Duration,
    /// Items older than this are dropped instead of dispatched.
    pub stale_after: Option<Duration>,
    /// Most recent error entries kept in the status.
    pub max_errors: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        OrchestratorConfig {
            retry: RetryPolicy::default(),
            periodic_interval: Duration::from_secs(5),
            stale_after: None,
            max_errors: 50,
        }
    }
}

type ForceRequest = oneshot::Sender<()>;

/// Builder for [`SyncOrchestrator`].
pub struct OrchestratorBuilder {
    store: Box<dyn QueueStore>,
    connectivity: Arc<ConnectivityMonitor>,
    processor: MutationProcessor,
    resolver: Box<dyn ConflictResolver>,
    clock: Arc<dyn ClockSource>,
    config: OrchestratorConfig,
}

impl OrchestratorBuilder {
    pub fn resolver(mut self, resolver: impl ConflictResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn clock(mut self, clock: impl ClockSource + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Hydrates the queue from the store and starts the drain task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> SyncOrchestrator {
        let items = self.store.load();
        if !items.is_empty() {
            tracing::info!("hydrated {} pending mutation(s)", items.len());
        }

        let inner = Arc::new(Inner {
            store: self.store,
            processor: self.processor,
            resolver: self.resolver,
            connectivity: self.connectivity,
            clock: self.clock,
            config: self.config,
            state: Mutex::new(QueueState {
                items,
                last_sync_time: None,
                errors: Vec::new(),
            }),
            syncing: AtomicBool::new(false),
            observers: Observers::new(),
            wake: Notify::new(),
        });

        let (force_tx, force_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let online_rx = inner.connectivity.subscribe();
        let task = tokio::spawn(run_loop(
            Arc::clone(&inner),
            force_rx,
            online_rx,
            cancel.clone(),
        ));

        SyncOrchestrator {
            inner,
            force_tx,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }
}

/// Durable, ordered, retrying mutation queue.
pub struct SyncOrchestrator {
    inner: Arc<Inner>,
    force_tx: mpsc::UnboundedSender<ForceRequest>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncOrchestrator {
    /// Starts building an orchestrator with last-writer-wins conflict
    /// resolution, the system clock and default tunables.
    pub fn builder(
        store: impl QueueStore + 'static,
        connectivity: Arc<ConnectivityMonitor>,
        processor: MutationProcessor,
    ) -> OrchestratorBuilder {
        OrchestratorBuilder {
            store: Box::new(store),
            connectivity,
            processor,
            resolver: Box::new(LastWriterWins),
            clock: Arc::new(SystemClock),
            config: OrchestratorConfig::default(),
        }
    }

    /// Appends a mutation and persists the queue.
    ///
    /// Returns the new item's id without waiting for the remote. Fails only
    /// if the queue could not be persisted; the item is still kept in memory
    /// and will be sent.
    pub fn enqueue(
        &self,
        action: Action,
        entity_type: EntityType,
        payload: Value,
    ) -> Result<String> {
        let now = self.inner.clock.now_ms();
        let id = generate_item_id(&entity_type, action, now);
        let item = QueueItem::new(id.clone(), action, entity_type, payload, now);
        tracing::debug!("enqueued {}", item.describe());

        let saved = {
            let mut state = self.inner.lock();
            state.items.push(item);
            self.inner.store.save(&state.items)
        };

        self.inner.publish();
        if self.inner.connectivity.is_online() {
            self.inner.wake.notify_one();
        }

        saved?;
        Ok(id)
    }

    /// Drains the queue now and waits for the pass to finish.
    ///
    /// Does nothing while offline. Cuts short a pending backoff wait.
    pub async fn force_sync_now(&self) -> SyncStatus {
        if !self.inner.connectivity.is_online() {
            tracing::debug!("force sync skipped: offline");
            return self.status();
        }

        let (tx, rx) = oneshot::channel();
        if self.force_tx.send(tx).is_ok() {
            // The sender is dropped unanswered only when the task stops.
            let _ = rx.await;
        }
        self.status()
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.status()
    }

    pub fn subscribe(&self, observer: impl SyncObserver + 'static) -> SubscriptionId {
        self.inner.observers.subscribe(Arc::new(observer))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.observers.unsubscribe(id)
    }

    /// Discards every pending mutation and recorded error.
    pub fn clear_queue(&self) -> Result<()> {
        let saved = {
            let mut state = self.inner.lock();
            if !state.items.is_empty() {
                tracing::info!("discarding {} pending mutation(s)", state.items.len());
            }
            state.items.clear();
            state.errors.clear();
            self.inner.store.save(&state.items)
        };
        self.inner.publish();
        saved?;
        Ok(())
    }

    pub fn clear_errors(&self) {
        self.inner.lock().errors.clear();
        self.inner.publish();
    }

    /// Snapshot of the queue in dispatch order.
    pub fn pending_items(&self) -> Vec<QueueItem> {
        self.inner.lock().items.clone()
    }

    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.inner.connectivity
    }

    /// Stops the drain task and the periodic timer.
    ///
    /// An in-flight remote call is abandoned; its item stays queued.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!("sync task ended abnormally: {}", e);
            }
            tracing::debug!("sync orchestrator stopped");
        }
    }
}

impl Drop for SyncOrchestrator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for SyncOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

struct QueueState {
    items: Vec<QueueItem>,
    last_sync_time: Option<DateTime<Utc>>,
    errors: Vec<SyncFailure>,
}

struct Inner {
    store: Box<dyn QueueStore>,
    processor: MutationProcessor,
    resolver: Box<dyn ConflictResolver>,
    connectivity: Arc<ConnectivityMonitor>,
    clock: Arc<dyn ClockSource>,
    config: OrchestratorConfig,
    state: Mutex<QueueState>,
    syncing: AtomicBool,
    observers: Observers,
    wake: Notify,
}

/// How one attempt on the head item ended.
enum Attempt {
    Done,
    Failed(String),
    /// Remove without further retries.
    Abandon(String),
}

async fn run_loop(
    inner: Arc<Inner>,
    mut force_rx: mpsc::UnboundedReceiver<ForceRequest>,
    mut online_rx: watch::Receiver<bool>,
    cancel: CancellationToken,
) {
    let mut scheduler = RetryScheduler::new(inner.config.retry);
    let period = inner.config.periodic_interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        let mut waiters = Vec::new();

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = inner.wake.notified() => {}
            changed = online_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let online = *online_rx.borrow_and_update();
                inner.publish();
                if !online {
                    continue;
                }
                tracing::info!("back online, draining sync queue");
            }
            request = force_rx.recv() => match request {
                Some(waiter) => waiters.push(waiter),
                None => break,
            },
            _ = ticker.tick() => {}
        }

        while let Ok(waiter) = force_rx.try_recv() {
            waiters.push(waiter);
        }

        inner
            .drain(&mut scheduler, &mut force_rx, &mut waiters, &cancel)
            .await;

        for waiter in waiters {
            let _ = waiter.send(());
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn status(&self) -> SyncStatus {
        let state = self.lock();
        SyncStatus {
            is_online: self.connectivity.is_online(),
            is_syncing: self.syncing.load(Ordering::SeqCst),
            queue_size: state.items.len(),
            last_sync_time: state.last_sync_time,
            errors: state.errors.clone(),
        }
    }

    fn publish(&self) {
        let status = self.status();
        self.observers.notify_status(&status);
    }

    fn set_syncing(&self, syncing: bool) {
        self.syncing.store(syncing, Ordering::SeqCst);
        self.publish();
    }

    /// Saves the queue. Callers hold the lock so saves land in order.
    fn persist(&self, state: &QueueState) {
        if let Err(e) = self.store.save(&state.items) {
            tracing::error!("failed to persist sync queue: {}", e);
        }
    }

    fn head(&self) -> Option<QueueItem> {
        self.lock().items.first().cloned()
    }

    /// Processes items from the head until the queue is empty, the device
    /// goes offline or the task is cancelled.
    async fn drain(
        &self,
        scheduler: &mut RetryScheduler,
        force_rx: &mut mpsc::UnboundedReceiver<ForceRequest>,
        waiters: &mut Vec<ForceRequest>,
        cancel: &CancellationToken,
    ) {
        if !self.connectivity.is_online() || self.lock().items.is_empty() {
            return;
        }
        if !scheduler.try_begin() {
            return;
        }
        self.set_syncing(true);

        loop {
            if cancel.is_cancelled() || !self.connectivity.is_online() {
                break;
            }
            let Some(item) = self.head() else {
                break;
            };
            scheduler.start_attempt();

            if let Some(reason) = self.stale_reason(&item) {
                self.abandon(&item.id, &reason);
                scheduler.on_dropped();
                continue;
            }

            let attempt = tokio::select! {
                _ = cancel.cancelled() => break,
                attempt = self.attempt(&item) => attempt,
            };

            match attempt {
                Attempt::Done => {
                    self.complete(&item.id);
                    scheduler.on_success();
                }
                Attempt::Abandon(reason) => {
                    self.abandon(&item.id, &reason);
                    scheduler.on_dropped();
                }
                Attempt::Failed(reason) => {
                    let Some(RetryDecision::Retry { delay }) =
                        self.fail(&item.id, scheduler, &reason)
                    else {
                        continue;
                    };
                    tracing::warn!(
                        "sync of {} failed: {}; retrying in {:?}",
                        item.describe(),
                        reason,
                        delay
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                        request = force_rx.recv() => {
                            if let Some(waiter) = request {
                                waiters.push(waiter);
                            }
                        }
                    }
                }
            }
        }

        scheduler.finish();
        self.set_syncing(false);
    }

    async fn attempt(&self, item: &QueueItem) -> Attempt {
        match self.processor.process(item).await {
            Ok(ProcessOutcome::Applied) | Ok(ProcessOutcome::Skipped) => Attempt::Done,
            Ok(ProcessOutcome::Conflict { remote }) => self.settle_conflict(item, remote).await,
            Err(e) => Attempt::Failed(e.to_string()),
        }
    }

    async fn settle_conflict(&self, item: &QueueItem, remote: Value) -> Attempt {
        let decision = self
            .resolver
            .resolve(&item.payload, &remote, &item.entity_type);
        tracing::info!(
            "conflict on {} resolved as {:?}",
            item.describe(),
            decision.strategy
        );

        let data = match decision.strategy {
            ConflictStrategy::Remote => return Attempt::Done,
            ConflictStrategy::Manual => {
                return Attempt::Abandon(MANUAL_RESOLUTION_REASON.to_string())
            }
            ConflictStrategy::Local => item.payload.clone(),
            ConflictStrategy::Merge => decision
                .merged_data
                .unwrap_or_else(|| item.payload.clone()),
        };

        match self.processor.apply_resolution(item, data).await {
            Ok(ProcessOutcome::Applied) | Ok(ProcessOutcome::Skipped) => Attempt::Done,
            Ok(ProcessOutcome::Conflict { .. }) => Attempt::Failed("version conflict".to_string()),
            Err(e) => Attempt::Failed(e.to_string()),
        }
    }

    fn stale_reason(&self, item: &QueueItem) -> Option<String> {
        let limit = self.config.stale_after?;
        let age_ms = u64::try_from(item.age_ms(self.clock.now_ms())).unwrap_or(0);
        (Duration::from_millis(age_ms) > limit)
            .then(|| format!("stale: queued more than {}s ago", limit.as_secs()))
    }

    fn complete(&self, item_id: &str) {
        {
            let mut state = self.lock();
            state.items.retain(|i| i.id != item_id);
            state.last_sync_time = Some(self.clock.now());
            state.errors.retain(|e| e.dropped || e.item_id != item_id);
            self.persist(&state);
        }
        tracing::debug!("synced {}", item_id);
        self.publish();
    }

    /// Records a failed attempt. Returns `None` if the item was cleared
    /// while in flight.
    fn fail(
        &self,
        item_id: &str,
        scheduler: &mut RetryScheduler,
        reason: &str,
    ) -> Option<RetryDecision> {
        let mut state = self.lock();
        let pos = state.items.iter().position(|i| i.id == item_id)?;
        let decision = scheduler.on_failure(&mut state.items[pos], reason);

        match decision {
            RetryDecision::Retry { .. } => {
                let failure = SyncFailure::for_item(&state.items[pos], reason);
                self.record_error(&mut state, failure);
                self.persist(&state);
                drop(state);
                self.publish();
            }
            RetryDecision::Drop => {
                let (item, failure) = self.take_dropped(&mut state, pos, reason);
                drop(state);
                self.report_dropped(&item, &failure);
            }
        }
        Some(decision)
    }

    /// Removes an item without retrying it.
    fn abandon(&self, item_id: &str, reason: &str) {
        let mut state = self.lock();
        let Some(pos) = state.items.iter().position(|i| i.id == item_id) else {
            return;
        };
        let (item, failure) = self.take_dropped(&mut state, pos, reason);
        drop(state);
        self.report_dropped(&item, &failure);
    }

    fn take_dropped(
        &self,
        state: &mut QueueState,
        pos: usize,
        reason: &str,
    ) -> (QueueItem, SyncFailure) {
        let item = state.items.remove(pos);
        let failure = SyncFailure::for_item(&item, reason).dropped();
        self.record_error(state, failure.clone());
        self.persist(state);
        (item, failure)
    }

    fn report_dropped(&self, item: &QueueItem, failure: &SyncFailure) {
        tracing::error!(
            "dropped {} after {} attempt(s): {}",
            item.describe(),
            failure.attempts,
            failure.message
        );
        self.observers.notify_dropped(item, failure);
        self.publish();
    }

    /// Keeps one entry per item, capped to the most recent entries.
    fn record_error(&self, state: &mut QueueState, failure: SyncFailure) {
        state.errors.retain(|e| e.item_id != failure.item_id);
        state.errors.push(failure);
        let excess = state.errors.len().saturating_sub(self.config.max_errors);
        state.errors.drain(..excess);
    }
}
