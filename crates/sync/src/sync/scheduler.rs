// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry bookkeeping for the drain loop.
//!
//! The scheduler does not sleep or spawn anything itself. The orchestrator
//! asks it whether a pass may start, reports each attempt's result, and
//! sleeps for whatever delay it hands back.

use std::time::Duration;

use ft_core::QueueItem;

/// Retry limits and backoff bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failed attempts after which an item is dropped.
    pub max_retries: u32,
    /// Base delay; each failure doubles the previous delay from here.
    pub floor: Duration,
    /// Upper bound on the delay.
    pub ceiling: Duration,
}

impl RetryPolicy {
    /// Ceiling applied when only a floor is given, as a multiple of the floor.
    pub const CEILING_FACTOR: u32 = 30;

    pub fn new(max_retries: u32, floor: Duration) -> Self {
        RetryPolicy {
            max_retries,
            floor,
            ceiling: floor.saturating_mul(Self::CEILING_FACTOR),
        }
    }

    pub fn with_ceiling(mut self, ceiling: Duration) -> Self {
        self.ceiling = ceiling.max(self.floor);
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            floor: Duration::from_secs(1),
            ceiling: Duration::from_secs(30),
        }
    }
}

/// Where the drain loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Processing,
    Backoff { delay: Duration },
}

/// What to do with an item after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Keep the item at the head and try again after `delay`.
    Retry { delay: Duration },
    /// Retries are exhausted; remove the item.
    Drop,
}

/// Tracks the drain state and the current backoff delay.
#[derive(Debug)]
pub struct RetryScheduler {
    policy: RetryPolicy,
    state: SchedulerState,
    delay: Duration,
}

impl RetryScheduler {
    pub fn new(policy: RetryPolicy) -> Self {
        RetryScheduler {
            policy,
            state: SchedulerState::Idle,
            delay: policy.floor,
        }
    }

    /// Starts a drain pass.
    ///
    /// Returns false if a pass is already running, in which case the caller
    /// must not start another.
    pub fn try_begin(&mut self) -> bool {
        if self.state != SchedulerState::Idle {
            return false;
        }
        self.state = SchedulerState::Processing;
        true
    }

    /// Marks the start of an attempt, leaving any backoff.
    pub fn start_attempt(&mut self) {
        self.state = SchedulerState::Processing;
    }

    /// Records a successful attempt; the next failure starts from the floor.
    pub fn on_success(&mut self) {
        self.delay = self.policy.floor;
    }

    /// Records a failed attempt on `item` and decides whether to keep it.
    pub fn on_failure(&mut self, item: &mut QueueItem, reason: &str) -> RetryDecision {
        let attempts = item.record_failure(reason);
        if attempts >= self.policy.max_retries {
            self.delay = self.policy.floor;
            return RetryDecision::Drop;
        }

        let delay = self.delay.saturating_mul(2).min(self.policy.ceiling);
        self.delay = delay;
        self.state = SchedulerState::Backoff { delay };
        RetryDecision::Retry { delay }
    }

    /// Records an item removed without a failed attempt (stale, or a conflict
    /// needing manual resolution).
    pub fn on_dropped(&mut self) {
        self.delay = self.policy.floor;
    }

    /// Ends the current drain pass.
    pub fn finish(&mut self) {
        self.state = SchedulerState::Idle;
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Delay of the most recent retry, or the floor after a reset.
    pub fn current_delay(&self) -> Duration {
        self.delay
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
