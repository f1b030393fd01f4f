// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline tracking.
//!
//! The monitor holds the current reachability flag and notifies subscribers
//! on each transition. It is a heuristic: the remote can still fail while the
//! monitor reports online, and the processor treats that as an ordinary
//! retryable failure.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Current reachability plus a transition feed.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        ConnectivityMonitor { tx }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Records the current reachability.
    ///
    /// Returns true if this was a transition. Repeating the current value
    /// does not notify subscribers.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            if online {
                tracing::info!("connectivity: online");
            } else {
                tracing::info!("connectivity: offline");
            }
        }
        changed
    }

    /// Receiver that wakes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Spawns a background probe that feeds this monitor.
    ///
    /// Every `interval` the probe opens a TCP connection to `address` and
    /// marks the monitor online if it succeeds within `timeout`.
    pub fn spawn_probe(
        self: &Arc<Self>,
        address: String,
        interval: Duration,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let reachable = probe_once(&address, timeout).await;
                        monitor.set_online(reachable);
                    }
                }
            }
            tracing::debug!("connectivity probe for {} stopped", address);
        })
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Returns true if a TCP connection to `address` opens within `timeout`.
pub async fn probe_once(address: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => {
            tracing::debug!("probe {} failed: {}", address, e);
            false
        }
        Err(_) => {
            tracing::debug!("probe {} timed out", address);
            false
        }
    }
}

/// Derives a `host:port` probe address from a `ws://` or `wss://` URL.
pub fn probe_address(url: &str) -> Option<String> {
    let (rest, default_port) = if let Some(rest) = url.strip_prefix("ws://") {
        (rest, 80)
    } else if let Some(rest) = url.strip_prefix("wss://") {
        (rest, 443)
    } else {
        return None;
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    if host_port.is_empty() {
        return None;
    }

    // Bracketed IPv6 literals carry colons of their own.
    let has_port = match host_port.rfind(']') {
        Some(end) => host_port[end..].contains(':'),
        None => host_port.contains(':'),
    };
    if has_port {
        Some(host_port.to_string())
    } else {
        Some(format!("{}:{}", host_port, default_port))
    }
}
