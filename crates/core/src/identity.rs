// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Acting user identity for remote writes.
//!
//! Every remote call is scoped to a user id. The id is resolved from the
//! authenticated session when one exists, otherwise from the session cached
//! on disk for offline use.

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Deserialize;

/// Resolves the id of the user on whose behalf mutations are applied.
pub trait IdentityProvider: Send + Sync {
    /// Returns `None` when no identity is available.
    fn current_user_id(&self) -> Option<String>;
}

impl<F> IdentityProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_user_id(&self) -> Option<String> {
        self()
    }
}

/// Cached offline session file contents.
#[derive(Debug, Deserialize)]
struct OfflineSession {
    #[serde(alias = "userId", alias = "uid")]
    user_id: String,
}

/// Identity backed by an in-memory session plus an offline session file.
///
/// Resolution order:
/// 1. Authenticated session set via [`SessionIdentity::set_session`]
/// 2. Offline session file (`{"userId": "..."}`)
/// 3. None
#[derive(Debug, Default)]
pub struct SessionIdentity {
    session: RwLock<Option<String>>,
    offline_session_path: Option<PathBuf>,
}

impl SessionIdentity {
    pub fn new(offline_session_path: Option<PathBuf>) -> Self {
        SessionIdentity {
            session: RwLock::new(None),
            offline_session_path,
        }
    }

    /// Starts with an authenticated session already present.
    pub fn with_session(user_id: impl Into<String>) -> Self {
        SessionIdentity {
            session: RwLock::new(Some(user_id.into())),
            offline_session_path: None,
        }
    }

    /// Replaces the authenticated session (`None` on sign-out).
    pub fn set_session(&self, user_id: Option<String>) {
        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        *session = user_id.filter(|id| !id.trim().is_empty());
    }

    fn session_user(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_user_id(&self) -> Option<String> {
        if let Some(id) = self.session_user() {
            return Some(id);
        }
        self.offline_session_path
            .as_deref()
            .and_then(read_offline_session)
    }
}

fn read_offline_session(path: &Path) -> Option<String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read offline session {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str::<OfflineSession>(&contents) {
        Ok(session) => Some(session.user_id).filter(|id| !id.trim().is_empty()),
        Err(e) => {
            tracing::warn!("ignoring malformed offline session {}: {}", path.display(), e);
            None
        }
    }
}
