// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote record store abstraction.
//!
//! The engine never talks to a concrete backend directly. Handlers in the
//! dispatch table call into a [`RemoteStore`], which is a WebSocket client
//! in production and an in-memory fake in tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ft_core::{EntityType, WriteMode};
use serde_json::Value;

/// Error type for remote operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    /// The remote could not be reached or the request timed out.
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// The remote refused the mutation.
    #[error("rejected by remote: {0}")]
    Rejected(String),

    /// A checked write found a diverged remote copy.
    #[error("version conflict")]
    Conflict {
        /// The remote's current copy of the record.
        remote: Value,
    },

    /// The remote answered with something unexpected.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Boxed future returned by [`RemoteStore`] methods.
pub type RemoteFuture<'a> = Pin<Box<dyn Future<Output = RemoteResult<()>> + Send + 'a>>;

/// A per-user remote record store.
pub trait RemoteStore: Send + Sync {
    /// Creates or replaces a record.
    fn upsert<'a>(
        &'a self,
        user_id: &'a str,
        entity_type: &'a EntityType,
        entity: &'a Value,
        mode: WriteMode,
    ) -> RemoteFuture<'a>;

    /// Deletes a record by id.
    fn delete<'a>(
        &'a self,
        user_id: &'a str,
        entity_type: &'a EntityType,
        entity_id: &'a str,
    ) -> RemoteFuture<'a>;
}

impl<R: RemoteStore + ?Sized> RemoteStore for Arc<R> {
    fn upsert<'a>(
        &'a self,
        user_id: &'a str,
        entity_type: &'a EntityType,
        entity: &'a Value,
        mode: WriteMode,
    ) -> RemoteFuture<'a> {
        (**self).upsert(user_id, entity_type, entity, mode)
    }

    fn delete<'a>(
        &'a self,
        user_id: &'a str,
        entity_type: &'a EntityType,
        entity_id: &'a str,
    ) -> RemoteFuture<'a> {
        (**self).delete(user_id, entity_type, entity_id)
    }
}
