// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Applies one queued mutation to the remote store.
//!
//! Routing goes through a [`DispatchTable`] keyed by `(entity type, action)`.
//! An item whose key has no handler is treated as applied: it is dropped
//! silently so that unknown types never block the queue.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ft_core::{Action, EntityType, IdentityProvider, QueueItem, WriteMode};
use serde_json::Value;

use super::remote::{RemoteError, RemoteResult, RemoteStore};

/// Everything a handler needs to apply one mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub user_id: String,
    pub entity_type: EntityType,
    pub action: Action,
    pub payload: Value,
    /// Target entity id, when the payload carries one.
    pub entity_id: Option<String>,
    pub mode: WriteMode,
}

type HandlerFuture = Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + 'static>>;

/// A registered mutation handler.
pub type Handler = Arc<dyn Fn(Dispatch) -> HandlerFuture + Send + Sync>;

/// Handlers keyed by entity type and action.
#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<(EntityType, Action), Handler>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for one `(entity type, action)` pair, replacing
    /// any previous handler.
    pub fn register<F, Fut>(&mut self, entity_type: EntityType, action: Action, handler: F)
    where
        F: Fn(Dispatch) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RemoteResult<()>> + Send + 'static,
    {
        let boxed: Handler =
            Arc::new(move |dispatch| -> HandlerFuture { Box::pin(handler(dispatch)) });
        self.handlers.insert((entity_type, action), boxed);
    }

    /// Builds a table that routes every action for `entity_types` to `remote`.
    ///
    /// Creates and updates share the upsert path; deletes go by entity id.
    pub fn for_remote<R>(remote: Arc<R>, entity_types: &[EntityType]) -> Self
    where
        R: RemoteStore + ?Sized + 'static,
    {
        let mut table = DispatchTable::new();
        for entity_type in entity_types {
            for action in [Action::Create, Action::Update] {
                let remote = Arc::clone(&remote);
                table.register(entity_type.clone(), action, move |d: Dispatch| {
                    let remote = Arc::clone(&remote);
                    async move {
                        remote
                            .upsert(&d.user_id, &d.entity_type, &d.payload, d.mode)
                            .await
                    }
                });
            }

            let remote = Arc::clone(&remote);
            table.register(entity_type.clone(), Action::Delete, move |d: Dispatch| {
                let remote = Arc::clone(&remote);
                async move {
                    let entity_id = d.entity_id.unwrap_or_default();
                    remote.delete(&d.user_id, &d.entity_type, &entity_id).await
                }
            });
        }
        table
    }

    pub fn get(&self, entity_type: &EntityType, action: Action) -> Option<&Handler> {
        self.handlers.get(&(entity_type.clone(), action))
    }

    pub fn is_registered(&self, entity_type: &EntityType, action: Action) -> bool {
        self.get(entity_type, action).is_some()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self
            .handlers
            .keys()
            .map(|(t, a)| format!("{}/{}", t, a))
            .collect();
        keys.sort();
        f.debug_struct("DispatchTable").field("handlers", &keys).finish()
    }
}

/// Result of one successful attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// The remote accepted the mutation.
    Applied,
    /// No handler for this item; it counts as done.
    Skipped,
    /// A write hit a diverged remote copy and needs resolution.
    Conflict { remote: Value },
}

/// Reason an attempt failed. Every variant is retryable.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProcessError {
    #[error("no identity available")]
    NoIdentity,

    #[error("missing entity id")]
    MissingEntityId,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Routes queue items through the dispatch table on behalf of the current user.
pub struct MutationProcessor {
    table: DispatchTable,
    identity: Arc<dyn IdentityProvider>,
}

impl MutationProcessor {
    pub fn new(table: DispatchTable, identity: Arc<dyn IdentityProvider>) -> Self {
        MutationProcessor { table, identity }
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Applies `item` with a checked write.
    pub async fn process(&self, item: &QueueItem) -> Result<ProcessOutcome, ProcessError> {
        self.dispatch(item, item.payload.clone(), WriteMode::Checked)
            .await
    }

    /// Writes the resolved record for a conflicted item, replacing the
    /// remote copy.
    pub async fn apply_resolution(
        &self,
        item: &QueueItem,
        data: Value,
    ) -> Result<ProcessOutcome, ProcessError> {
        self.dispatch(item, data, WriteMode::Overwrite).await
    }

    async fn dispatch(
        &self,
        item: &QueueItem,
        payload: Value,
        mode: WriteMode,
    ) -> Result<ProcessOutcome, ProcessError> {
        let Some(handler) = self.table.get(&item.entity_type, item.action) else {
            tracing::debug!("no handler for {}, skipping", item.describe());
            return Ok(ProcessOutcome::Skipped);
        };

        let user_id = self
            .identity
            .current_user_id()
            .ok_or(ProcessError::NoIdentity)?;

        let entity_id = item.entity_id();
        if item.action == Action::Delete && entity_id.is_none() {
            return Err(ProcessError::MissingEntityId);
        }

        let dispatch = Dispatch {
            user_id,
            entity_type: item.entity_type.clone(),
            action: item.action,
            payload,
            entity_id,
            mode,
        };

        match handler(dispatch).await {
            Ok(()) => Ok(ProcessOutcome::Applied),
            Err(RemoteError::Conflict { remote }) if item.action.is_write() => {
                Ok(ProcessOutcome::Conflict { remote })
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl fmt::Debug for MutationProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationProcessor")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
