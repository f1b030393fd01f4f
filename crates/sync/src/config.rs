// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.
//!
//! Configuration is stored in `config.toml` inside the state directory.
//! Every field is optional; a missing file means all defaults and no remote.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{OrchestratorConfig, RetryPolicy};

pub const CONFIG_FILE_NAME: &str = "config.toml";
const APP_DIR_NAME: &str = "ftsync";

/// Engine configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Failed attempts after which a mutation is dropped (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay after the first failure in milliseconds (default: 1000).
    #[serde(default = "default_backoff_floor_ms")]
    pub backoff_floor_ms: u64,
    /// Upper bound on the retry delay in milliseconds (default: 30000).
    #[serde(default = "default_backoff_ceiling_ms")]
    pub backoff_ceiling_ms: u64,
    /// Interval of the periodic drain in seconds (default: 5).
    #[serde(default = "default_periodic_sync_secs")]
    pub periodic_sync_secs: u64,
    /// Drop mutations queued longer than this many seconds ago.
    #[serde(default)]
    pub stale_after_secs: Option<u64>,
    /// Remote record store (optional; without it the queue only accumulates).
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Remote record store connection settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteConfig {
    /// WebSocket URL (`ws://...` or `wss://...`).
    pub url: String,
    /// Max time to wait for a reply in milliseconds (default: 10000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Reachability probe interval in seconds (default: 5).
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

/// Where the acting user's id comes from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IdentityConfig {
    /// Authenticated session user id.
    #[serde(default)]
    pub session_user_id: Option<String>,
    /// Cached offline session file, relative to the state directory unless absolute.
    #[serde(default)]
    pub offline_session_file: Option<String>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_floor_ms() -> u64 {
    1_000
}

fn default_backoff_ceiling_ms() -> u64 {
    30_000
}

fn default_periodic_sync_secs() -> u64 {
    5
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_probe_interval_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_retries: default_max_retries(),
            backoff_floor_ms: default_backoff_floor_ms(),
            backoff_ceiling_ms: default_backoff_ceiling_ms(),
            periodic_sync_secs: default_periodic_sync_secs(),
            stale_after_secs: None,
            remote: None,
            identity: IdentityConfig::default(),
        }
    }
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RemoteConfig {
            url: url.into(),
            request_timeout_ms: default_request_timeout_ms(),
            probe_interval_secs: default_probe_interval_secs(),
        }
    }

    /// Returns an error message if the URL is not a WebSocket URL.
    pub fn validate_url(&self) -> Option<String> {
        if self.url.starts_with("ws://") || self.url.starts_with("wss://") {
            return None;
        }
        Some(format!(
            "invalid remote URL '{}': must be ws:// or wss://",
            self.url
        ))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }
}

impl Config {
    /// Loads configuration from `state_dir`, falling back to defaults when
    /// no config file exists.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let config_path = state_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".to_string()));
        }
        if self.backoff_floor_ms == 0 {
            return Err(Error::Config(
                "backoff_floor_ms must be greater than 0".to_string(),
            ));
        }
        if self.backoff_ceiling_ms < self.backoff_floor_ms {
            return Err(Error::Config(format!(
                "backoff_ceiling_ms ({}) must not be below backoff_floor_ms ({})",
                self.backoff_ceiling_ms, self.backoff_floor_ms
            )));
        }
        if self.periodic_sync_secs == 0 {
            return Err(Error::Config(
                "periodic_sync_secs must be greater than 0".to_string(),
            ));
        }
        if let Some(remote) = &self.remote {
            if let Some(msg) = remote.validate_url() {
                return Err(Error::Config(msg));
            }
            if remote.request_timeout_ms == 0 || remote.probe_interval_secs == 0 {
                return Err(Error::Config(
                    "remote timeouts and intervals must be greater than 0".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.backoff_floor_ms))
            .with_ceiling(Duration::from_millis(self.backoff_ceiling_ms))
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            retry: self.retry_policy(),
            periodic_interval: Duration::from_secs(self.periodic_sync_secs),
            stale_after: self.stale_after_secs.map(Duration::from_secs),
            ..OrchestratorConfig::default()
        }
    }

    /// Returns the remote section, or an error naming the config file to edit.
    pub fn require_remote(&self, state_dir: &Path) -> Result<&RemoteConfig> {
        self.remote.as_ref().ok_or_else(|| {
            Error::NoRemote(state_dir.join(CONFIG_FILE_NAME).display().to_string())
        })
    }

    /// Resolves the offline session file against `state_dir`.
    pub fn offline_session_path(&self, state_dir: &Path) -> Option<PathBuf> {
        self.identity
            .offline_session_file
            .as_deref()
            .map(|file| state_dir.join(file))
    }
}

/// Resolves the state directory.
///
/// Order: explicit override, `$FTSYNC_STATE_DIR`, `$XDG_STATE_HOME/ftsync`,
/// then `~/.local/state/ftsync`.
pub fn state_dir(override_dir: Option<&Path>) -> PathBuf {
    resolve_state_dir(
        override_dir.map(Path::to_path_buf),
        env::state_dir(),
        env::xdg_state_home(),
        dirs::home_dir(),
    )
}

fn resolve_state_dir(
    override_dir: Option<PathBuf>,
    env_dir: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = override_dir.or(env_dir) {
        return dir;
    }
    if let Some(dir) = xdg_state_home {
        return dir.join(APP_DIR_NAME);
    }
    home.unwrap_or_default()
        .join(".local/state")
        .join(APP_DIR_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
