// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the connectivity monitor.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::connectivity::*;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use yare::parameterized;

#[test]
fn test_initial_state() {
    assert!(ConnectivityMonitor::new(true).is_online());
    assert!(!ConnectivityMonitor::new(false).is_online());
    assert!(!ConnectivityMonitor::default().is_online());
}

#[test]
fn test_set_online_reports_transitions_only() {
    let monitor = ConnectivityMonitor::new(false);
    assert!(monitor.set_online(true));
    assert!(!monitor.set_online(true));
    assert!(monitor.set_online(false));
    assert!(!monitor.set_online(false));
}

#[tokio::test]
async fn test_subscribers_see_transitions() {
    let monitor = ConnectivityMonitor::new(false);
    let mut rx = monitor.subscribe();

    monitor.set_online(true);
    rx.changed().await.unwrap();
    assert!(*rx.borrow_and_update());

    // Repeating the same value is not a transition
    monitor.set_online(true);
    assert!(!rx.has_changed().unwrap());

    monitor.set_online(false);
    rx.changed().await.unwrap();
    assert!(!*rx.borrow_and_update());
}

#[tokio::test]
async fn test_probe_marks_online_when_listener_accepts() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        loop {
            let _ = listener.accept().await;
        }
    });

    let monitor = Arc::new(ConnectivityMonitor::new(false));
    let mut rx = monitor.subscribe();
    let cancel = CancellationToken::new();
    let handle = monitor.spawn_probe(
        addr,
        Duration::from_millis(20),
        Duration::from_secs(1),
        cancel.clone(),
    );

    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .expect("probe should report a transition")
        .unwrap();
    assert!(monitor.is_online());

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_probe_once_fails_for_closed_port() {
    // Bind then drop to get a port that is very likely closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    assert!(!probe_once(&addr, Duration::from_millis(500)).await);
}

#[parameterized(
    ws_with_port = { "ws://localhost:7890", Some("localhost:7890") },
    ws_default_port = { "ws://sync.example.com/api", Some("sync.example.com:80") },
    wss_default_port = { "wss://sync.example.com", Some("sync.example.com:443") },
    with_userinfo = { "wss://user:pw@sync.example.com:8443/x", Some("sync.example.com:8443") },
    ipv6 = { "ws://[::1]:9000", Some("[::1]:9000") },
    ipv6_default = { "ws://[::1]/", Some("[::1]:80") },
    http = { "http://example.com", None },
    empty_host = { "ws:///path", None },
)]
fn test_probe_address(url: &str, expected: Option<&str>) {
    assert_eq!(probe_address(url).as_deref(), expected);
}
