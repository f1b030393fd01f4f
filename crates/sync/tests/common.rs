// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Shared across test binaries; not every file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `ftsync` bound to the given state directory.
pub fn ftsync(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("ftsync");
    cmd.arg("--state-dir")
        .arg(state.path())
        .env_remove("FTSYNC_STATE_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// Queues a mutation and returns the printed item id.
pub fn enqueue(state: &TempDir, action: &str, entity_type: &str, payload: &str) -> String {
    let output = ftsync(state)
        .args(["enqueue", action, entity_type, payload])
        .output()
        .unwrap();
    assert!(output.status.success(), "enqueue failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn write_config(state: &TempDir, toml: &str) {
    fs::write(state.path().join("config.toml"), toml).unwrap();
}

/// A ws:// URL on a local port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("ws://127.0.0.1:{}", port)
}
