// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable storage for the pending mutation queue.
//!
//! The whole ordered queue is stored as one JSON array and rewritten on
//! every change. Writes go to a sibling temp file which is fsynced and then
//! renamed over the queue file, so a crash mid-write leaves either the old
//! or the new queue on disk, never a torn one.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ft_core::QueueItem;

/// Well-known file name for the persisted queue.
pub const QUEUE_FILE_NAME: &str = "fintrack_sync_queue.json";

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for queue operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for the ordered mutation queue.
pub trait QueueStore: Send + Sync {
    /// Loads the persisted queue in order.
    ///
    /// Never fails: unreadable or malformed data is logged and treated as an
    /// empty queue.
    fn load(&self) -> Vec<QueueItem>;

    /// Replaces the persisted queue with `items`.
    fn save(&self, items: &[QueueItem]) -> StoreResult<()>;
}

impl<S: QueueStore + ?Sized> QueueStore for Arc<S> {
    fn load(&self) -> Vec<QueueItem> {
        (**self).load()
    }

    fn save(&self, items: &[QueueItem]) -> StoreResult<()> {
        (**self).save(items)
    }
}

/// Queue stored as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct FileQueueStore {
    /// Path to the queue file.
    path: PathBuf,
}

impl FileQueueStore {
    /// Opens the queue at the given path, creating parent directories.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(FileQueueStore {
            path: path.to_path_buf(),
        })
    }

    /// Opens the well-known queue file inside `state_dir`.
    pub fn in_dir(state_dir: &Path) -> StoreResult<Self> {
        Self::open(&state_dir.join(QUEUE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl QueueStore for FileQueueStore {
    fn load(&self) -> Vec<QueueItem> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(
                    "failed to read sync queue {}: {}; starting empty",
                    self.path.display(),
                    e
                );
                return Vec::new();
            }
        };

        if contents.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<QueueItem>>(&contents) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    "corrupt sync queue {}: {}; starting empty",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save(&self, items: &[QueueItem]) -> StoreResult<()> {
        let json = serde_json::to_vec(items)?;
        let temp = self.temp_path();

        let mut file = File::create(&temp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp, &self.path)?;

        // Persist the rename itself; not every platform supports syncing a directory.
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }
}

/// In-memory queue store.
///
/// Used for hosts without durable storage and for tests, which can inspect
/// what was saved and inject save failures.
#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    items: Mutex<Vec<QueueItem>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `items`, as if left by a previous run.
    pub fn with_items(items: Vec<QueueItem>) -> Self {
        MemoryQueueStore {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    /// Returns the last saved queue.
    pub fn saved(&self) -> Vec<QueueItem> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Makes subsequent saves fail with an I/O error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl QueueStore for MemoryQueueStore {
    fn load(&self) -> Vec<QueueItem> {
        self.saved()
    }

    fn save(&self, items: &[QueueItem]) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("save disabled")));
        }
        *self.items.lock().unwrap_or_else(|e| e.into_inner()) = items.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
