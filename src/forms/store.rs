//! Configuration document store — the single committed engine state.
//!
//! The store owns the engine and the latest state. `dispatch` is the only
//! write path; readers take snapshots or subscribe to a watch channel that
//! always holds the newest committed version.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::error::Rejection;

use super::command::Command;
use super::engine::Engine;
use super::model::Configuration;
use super::state::EngineState;

/// A committed state together with its version.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub version: u64,
    pub committed_at: DateTime<Utc>,
    pub state: Arc<EngineState>,
}

/// Owned, versioned holder of the engine state.
pub struct DocumentStore {
    engine: Engine,
    current: Snapshot,
    tx: watch::Sender<Snapshot>,
}

impl DocumentStore {
    /// A store starting from the engine's initial one-step document.
    pub fn new(engine: Engine) -> Self {
        let state = engine.initial_state();
        Self::from_state(engine, state)
    }

    /// A store starting from an existing document. The document goes
    /// through `Load`, so it is normalized and its ids repaired first.
    pub fn with_configuration(engine: Engine, configuration: Configuration) -> Self {
        let state = engine.apply(&engine.initial_state(), Command::Load { configuration });
        Self::from_state(engine, state)
    }

    fn from_state(engine: Engine, state: EngineState) -> Self {
        let current = Snapshot {
            version: 0,
            committed_at: Utc::now(),
            state: Arc::new(state),
        };
        let (tx, _rx) = watch::channel(current.clone());
        Self {
            engine,
            current,
            tx,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn state(&self) -> &EngineState {
        &self.current.state
    }

    pub fn version(&self) -> u64 {
        self.current.version
    }

    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    /// Receive every committed snapshot from now on.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Run a command against the committed state.
    ///
    /// Returns the version after the command. A command that leaves the
    /// state identical commits nothing and keeps the version; a rejected
    /// command returns the rejection and commits nothing.
    pub fn dispatch(&mut self, command: Command) -> Result<u64, Rejection> {
        let name = command.name();
        let next = self.engine.try_apply(&self.current.state, command)?;
        if next == *self.current.state {
            debug!(command = name, version = self.current.version, "Command left state unchanged");
            return Ok(self.current.version);
        }

        self.current = Snapshot {
            version: self.current.version + 1,
            committed_at: Utc::now(),
            state: Arc::new(next),
        };
        debug!(command = name, version = self.current.version, "State committed");

        // Ok if nobody is subscribed.
        self.tx.send_replace(self.current.clone());
        Ok(self.current.version)
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("version", &self.current.version)
            .field("committed_at", &self.current.committed_at)
            .finish_non_exhaustive()
    }
}
