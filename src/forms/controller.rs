//! ConfigurationController — sequences persistence calls around the store.
//!
//! The command processor never awaits anything. Loading and saving happen
//! here: flag the store as loading, await the gateway, then commit the
//! result through an ordinary `Load` command. A failed gateway call only
//! clears the loading flag; the committed document is left as it was.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, watch};
use tracing::{info, warn};

use crate::error::{Error, Rejection};

use super::command::Command;
use super::gateway::PersistenceGateway;
use super::model::StepId;
use super::store::{DocumentStore, Snapshot};
use super::validate::validate;

/// Coordinates the document store with a persistence gateway.
pub struct ConfigurationController {
    store: Arc<RwLock<DocumentStore>>,
    gateway: Arc<dyn PersistenceGateway>,
    next_request: AtomicU64,
}

impl ConfigurationController {
    pub fn new(store: DocumentStore, gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            gateway,
            next_request: AtomicU64::new(0),
        }
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> Arc<RwLock<DocumentStore>> {
        Arc::clone(&self.store)
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.store.read().await.snapshot()
    }

    pub async fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.store.read().await.subscribe()
    }

    /// Forward an edit to the store.
    pub async fn dispatch(&self, command: Command) -> Result<u64, Rejection> {
        let name = command.name();
        let result = self.store.write().await.dispatch(command);
        if let Err(ref rejection) = result {
            warn!(command = name, reason = %rejection, "Edit rejected");
        }
        result
    }

    fn request_token(&self) -> u64 {
        self.next_request.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn is_latest(&self, token: u64) -> bool {
        self.next_request.load(Ordering::Relaxed) == token
    }

    async fn set_loading(&self, loading: bool) -> Result<u64, Rejection> {
        self.store
            .write()
            .await
            .dispatch(Command::SetLoading { loading })
    }

    /// Fetch `key` from the gateway and make it the current document.
    ///
    /// Overlapping loads are not cancelled; whichever response arrives
    /// last is the one that stays committed.
    pub async fn load(&self, key: &str) -> Result<u64, Error> {
        let token = self.request_token();
        self.set_loading(true).await?;
        info!(key = %key, request = token, "Loading configuration");

        match self.gateway.load(key).await {
            Ok(configuration) => {
                let version = self
                    .store
                    .write()
                    .await
                    .dispatch(Command::Load { configuration })?;
                info!(key = %key, request = token, version, "Configuration committed");
                Ok(version)
            }
            Err(e) => {
                warn!(key = %key, request = token, error = %e, "Failed to load configuration");
                // A newer request is still in flight and owns the flag.
                if self.is_latest(token) {
                    self.set_loading(false).await?;
                }
                Err(e.into())
            }
        }
    }

    /// Persist the current document and adopt what the gateway stored.
    ///
    /// Edits made while the save is in flight are kept: the stored copy is
    /// only adopted if the document did not change in the meantime. Selection
    /// changes alone do not count as edits.
    pub async fn save(&self) -> Result<u64, Error> {
        let token = self.request_token();
        let configuration = {
            let mut store = self.store.write().await;
            let violations = validate(store.state());
            if !violations.is_empty() {
                return Err(Error::Invalid(violations));
            }
            let configuration = store.state().configuration.clone();
            store.dispatch(Command::SetLoading { loading: true })?;
            configuration
        };
        info!(key = %configuration.key, request = token, "Saving configuration");

        let saved = match self.gateway.save(&configuration).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!(
                    key = %configuration.key,
                    request = token,
                    error = %e,
                    "Failed to save configuration"
                );
                self.set_loading(false).await?;
                return Err(e.into());
            }
        };

        let mut store = self.store.write().await;
        if store.state().configuration != configuration {
            info!(
                key = %saved.key,
                request = token,
                "Document changed while saving; keeping local edits"
            );
            return Ok(store.dispatch(Command::SetLoading { loading: false })?);
        }

        let active = store.state().active_step_id.clone();
        store.dispatch(Command::Load { configuration: saved })?;
        let version = restore_selection(&mut store, active)?;
        let key = store.state().configuration.key.clone();
        info!(key = %key, request = token, version, "Configuration saved");
        Ok(version)
    }
}

/// Re-select the step that was active when the save completed, if it still exists.
fn restore_selection(
    store: &mut DocumentStore,
    active: Option<StepId>,
) -> Result<u64, Rejection> {
    match active {
        Some(id) if store.state().step(&id).is_some() => {
            store.dispatch(Command::SetActiveStep { step_id: Some(id) })
        }
        _ => Ok(store.version()),
    }
}
