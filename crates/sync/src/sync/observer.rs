// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Status listeners.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use ft_core::{QueueItem, SyncFailure, SyncStatus};

/// Receives status snapshots and lost-mutation events.
pub trait SyncObserver: Send + Sync {
    /// Called after every change to the sync status.
    fn on_status(&self, status: &SyncStatus);

    /// Called once for each mutation removed without being applied.
    fn on_dropped(&self, _item: &QueueItem, _failure: &SyncFailure) {}
}

impl<F> SyncObserver for F
where
    F: Fn(&SyncStatus) + Send + Sync,
{
    fn on_status(&self, status: &SyncStatus) {
        self(status)
    }
}

/// Handle returned by subscribe, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered listeners.
///
/// Listeners are invoked outside the lock, and a panicking listener is
/// logged and skipped without affecting the others.
#[derive(Default)]
pub struct Observers {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Arc<dyn SyncObserver>)>>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn SyncObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, observer));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn notify_status(&self, status: &SyncStatus) {
        for (id, observer) in self.snapshot() {
            if catch_unwind(AssertUnwindSafe(|| observer.on_status(status))).is_err() {
                tracing::error!("status listener {:?} panicked", id);
            }
        }
    }

    pub fn notify_dropped(&self, item: &QueueItem, failure: &SyncFailure) {
        for (id, observer) in self.snapshot() {
            if catch_unwind(AssertUnwindSafe(|| observer.on_dropped(item, failure))).is_err() {
                tracing::error!("status listener {:?} panicked on dropped item", id);
            }
        }
    }

    fn snapshot(&self) -> Vec<(SubscriptionId, Arc<dyn SyncObserver>)> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Arc<dyn SyncObserver>)>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}
