//! Persistence gateway — loads and saves configuration documents.
//!
//! The engine only depends on the [`PersistenceGateway`] trait. Documents
//! travel as opaque JSON objects and are treated as untrusted until the
//! engine has normalized them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde_json::Value;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::GatewayError;

use super::model::Configuration;

/// Backend-agnostic document storage.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Fetch the document stored under `key`.
    async fn load(&self, key: &str) -> Result<Configuration, GatewayError>;

    /// Store a document under its `key`, returning what was persisted.
    async fn save(&self, configuration: &Configuration) -> Result<Configuration, GatewayError>;
}

fn require_key(configuration: &Configuration) -> Result<&str, GatewayError> {
    if configuration.key.trim().is_empty() {
        return Err(GatewayError::Conflict {
            id: configuration.name.clone(),
            reason: "configuration key is empty".to_string(),
        });
    }
    Ok(&configuration.key)
}

/// Gateway keeping raw JSON documents in memory.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    documents: RwLock<HashMap<String, Value>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw document, bypassing any shape checks.
    pub async fn insert_raw(&self, key: impl Into<String>, document: Value) {
        self.documents.write().await.insert(key.into(), document);
    }

    pub async fn get_raw(&self, key: &str) -> Option<Value> {
        self.documents.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn load(&self, key: &str) -> Result<Configuration, GatewayError> {
        let raw = self
            .documents
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound { id: key.to_string() })?;
        Ok(Configuration::from_json(raw)?)
    }

    async fn save(&self, configuration: &Configuration) -> Result<Configuration, GatewayError> {
        let key = require_key(configuration)?.to_string();
        let raw = configuration.to_json()?;
        self.documents.write().await.insert(key.clone(), raw);
        debug!(key = %key, "Configuration stored in memory");
        Ok(configuration.clone())
    }
}

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("static regex"));

/// Gateway storing one pretty-printed JSON file per document.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    base_path: PathBuf,
}

impl JsonFileGateway {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File a key is stored in. Bytes of characters outside `[A-Za-z0-9_-]`
    /// are percent-encoded, so distinct keys never share a file.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let stem = UNSAFE_FILE_CHARS.replace_all(key, |caps: &Captures<'_>| {
            caps[0]
                .bytes()
                .map(|b| format!("%{b:02X}"))
                .collect::<String>()
        });
        self.base_path.join(format!("{stem}.json"))
    }
}

#[async_trait]
impl PersistenceGateway for JsonFileGateway {
    async fn load(&self, key: &str) -> Result<Configuration, GatewayError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GatewayError::NotFound { id: key.to_string() });
            }
            Err(e) => return Err(e.into()),
        };
        let raw: Value = serde_json::from_slice(&bytes)?;
        let configuration = Configuration::from_json(raw)?;
        if configuration.key != key {
            return Err(GatewayError::Conflict {
                id: key.to_string(),
                reason: format!("file holds configuration '{}'", configuration.key),
            });
        }
        debug!(key = %key, path = %path.display(), "Configuration read from disk");
        Ok(configuration)
    }

    async fn save(&self, configuration: &Configuration) -> Result<Configuration, GatewayError> {
        let key = require_key(configuration)?;
        fs::create_dir_all(&self.base_path).await?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(configuration)?;
        fs::write(&tmp, &body).await?;
        fs::rename(&tmp, &path).await?;

        info!(key = %key, path = %path.display(), bytes = body.len(), "Configuration saved");
        Ok(configuration.clone())
    }
}
