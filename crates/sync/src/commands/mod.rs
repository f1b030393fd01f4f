// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod enqueue;
pub mod queue;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ft_core::{EntityType, SessionIdentity};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::sync::{
    probe_address, probe_once, ConnectivityMonitor, DispatchTable, FileQueueStore,
    MutationProcessor, SyncOrchestrator, WebSocketRemote,
};

/// Resolved state directory plus its configuration.
#[derive(Debug)]
pub struct Context {
    pub state_dir: PathBuf,
    pub config: Config,
}

impl Context {
    pub fn load(state_dir_override: Option<&Path>) -> Result<Self> {
        let state_dir = config::state_dir(state_dir_override);
        let config = Config::load(&state_dir)?;
        Ok(Context { state_dir, config })
    }

    pub fn open_store(&self) -> Result<FileQueueStore> {
        Ok(FileQueueStore::in_dir(&self.state_dir)?)
    }

    fn identity(&self) -> SessionIdentity {
        let identity = SessionIdentity::new(self.config.offline_session_path(&self.state_dir));
        identity.set_session(self.config.identity.session_user_id.clone());
        identity
    }

    /// Orchestrator that only persists: it never considers itself online.
    pub fn local_orchestrator(&self) -> Result<SyncOrchestrator> {
        let processor = MutationProcessor::new(DispatchTable::new(), Arc::new(self.identity()));
        Ok(SyncOrchestrator::builder(
            self.open_store()?,
            Arc::new(ConnectivityMonitor::new(false)),
            processor,
        )
        .config(self.config.orchestrator_config())
        .start())
    }

    /// Orchestrator wired to the configured remote, with a reachability probe.
    ///
    /// Probes once before starting so the initial status is accurate.
    pub async fn remote_engine(&self) -> Result<Engine> {
        let remote_config = self.config.require_remote(&self.state_dir)?;
        let address = probe_address(&remote_config.url).ok_or_else(|| {
            Error::Config(format!("cannot derive host from '{}'", remote_config.url))
        })?;

        let connectivity = Arc::new(ConnectivityMonitor::new(false));
        connectivity.set_online(probe_once(&address, remote_config.request_timeout()).await);

        let remote = Arc::new(WebSocketRemote::new(
            remote_config.url.clone(),
            remote_config.request_timeout(),
        ));
        let processor = MutationProcessor::new(
            DispatchTable::for_remote(remote, &EntityType::KNOWN),
            Arc::new(self.identity()),
        );
        let orchestrator =
            SyncOrchestrator::builder(self.open_store()?, Arc::clone(&connectivity), processor)
                .config(self.config.orchestrator_config())
                .start();

        let cancel = CancellationToken::new();
        let probe = connectivity.spawn_probe(
            address,
            remote_config.probe_interval(),
            remote_config.request_timeout(),
            cancel.clone(),
        );

        Ok(Engine {
            orchestrator,
            cancel,
            probe,
        })
    }
}

/// A running orchestrator plus the probe feeding its connectivity.
pub struct Engine {
    pub orchestrator: SyncOrchestrator,
    cancel: CancellationToken,
    probe: JoinHandle<()>,
}

impl Engine {
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.probe.await;
        self.orchestrator.shutdown().await;
    }
}
