//! Persisted configuration store interface.
//!
//! A store is a remote or local key/value object store addressed by
//! [`StoreKey`]. Documents are wrapped in a [`ConfigDocument`] envelope:
//!
//! ```json
//! {
//!   "_objectType": "org.zowe.editor.monaco.editor.config",
//!   "_metaDataVersion": "1.0.0",
//!   "config": { "theme": "vs-dark" }
//! }
//! ```

use std::{collections::HashMap, fmt, future::Future, sync::Mutex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{data::ConfigTree, error::StoreError};

/// Object type written into every stored document.
pub const DEFAULT_OBJECT_TYPE: &str = "org.zowe.editor.monaco.editor.config";

/// Metadata version written into every stored document.
pub const DEFAULT_METADATA_VERSION: &str = "1.0.0";

/// Owner scope of a stored document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Per-user settings.
    #[default]
    User,
    /// Per-installation settings.
    Instance,
    /// Site-wide settings.
    Site,
    /// Product defaults.
    Product,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Instance => "instance",
            Scope::Site => "site",
            Scope::Product => "product",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a stored configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreKey {
    /// Owner scope.
    pub scope: Scope,
    /// Plugin identifier owning the document.
    pub plugin: String,
    /// Namespace within the plugin.
    pub namespace: String,
    /// Logical document name.
    pub name: String,
}

impl StoreKey {
    pub fn new(
        scope: Scope,
        plugin: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            scope,
            plugin: plugin.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl Default for StoreKey {
    fn default() -> Self {
        Self::new(
            Scope::User,
            "org.zowe.editor",
            "monaco",
            "editorconfig.json",
        )
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.scope, self.plugin, self.namespace, self.name
        )
    }
}

/// Envelope stored for a configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "_objectType", default = "default_object_type")]
    pub object_type: String,
    #[serde(rename = "_metaDataVersion", default = "default_metadata_version")]
    pub metadata_version: String,
    pub config: ConfigTree,
}

fn default_object_type() -> String {
    DEFAULT_OBJECT_TYPE.to_string()
}

fn default_metadata_version() -> String {
    DEFAULT_METADATA_VERSION.to_string()
}

impl ConfigDocument {
    pub fn new(config: ConfigTree) -> Self {
        Self {
            object_type: default_object_type(),
            metadata_version: default_metadata_version(),
            config,
        }
    }

    /// The `config` member of a raw stored document, if present.
    pub fn config_of(document: &Value) -> Option<&Value> {
        document.get("config")
    }
}

/// Key/value store holding configuration documents.
///
/// Reads return the raw JSON document so shape validation happens in the
/// [`Reconciler`](crate::Reconciler), where a bad document falls back to
/// defaults instead of failing the fetch.
pub trait ConfigStore {
    /// Read a document. `Ok(None)` when nothing is stored under `key`.
    fn fetch(&self, key: &StoreKey) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Replace the document stored under `key`.
    fn store(
        &self,
        key: &StoreKey,
        document: &ConfigDocument,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove the document stored under `key`. Removing a missing document
    /// succeeds.
    fn delete(&self, key: &StoreKey) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-process store backed by a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<StoreKey, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a raw document, bypassing the envelope. Useful for seeding.
    pub fn insert_raw(&self, key: StoreKey, document: Value) -> Result<(), StoreError> {
        self.lock()?.insert(key, document);
        Ok(())
    }

    pub fn get_raw(&self, key: &StoreKey) -> Result<Option<Value>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<StoreKey, Value>>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl ConfigStore for MemoryStore {
    async fn fetch(&self, key: &StoreKey) -> Result<Option<Value>, StoreError> {
        self.get_raw(key)
    }

    async fn store(&self, key: &StoreKey, document: &ConfigDocument) -> Result<(), StoreError> {
        let value = serde_json::to_value(document)?;
        self.insert_raw(key.clone(), value)
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}
