// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn system_clock_is_after_2020() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_ms() > 1_577_836_800_000);
}

#[test]
fn manual_clock_set_and_advance() {
    let clock = ManualClock::new(1_000);
    assert_eq!(clock.now_ms(), 1_000);

    clock.advance(250);
    assert_eq!(clock.now_ms(), 1_250);

    clock.set(42);
    assert_eq!(clock.now_ms(), 42);
}

#[test]
fn clock_ref_and_arc_delegate() {
    let clock = ManualClock::new(7);
    let by_ref = &clock;
    assert_eq!(ClockSource::now_ms(&by_ref), 7);

    let shared: Arc<dyn ClockSource> = Arc::new(ManualClock::new(9));
    assert_eq!(shared.now_ms(), 9);
}

#[test]
fn now_converts_millis_to_datetime() {
    let clock = ManualClock::new(1_700_000_000_123);
    let dt = clock.now();
    assert_eq!(dt.timestamp_millis(), 1_700_000_000_123);
}

#[test]
fn from_millis_handles_epoch() {
    assert_eq!(from_millis(0).timestamp(), 0);
}
