//! File-backed configuration store.
//!
//! Documents live at `<root>/<scope>/<plugin>/<namespace>/<name>` as pretty
//! printed JSON envelopes.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::SystemTime,
};

use optsync::{
    StoreError, Value,
    store::{ConfigDocument, ConfigStore, StoreKey},
};
use tokio::fs;

/// [`ConfigStore`] that keeps each document in its own file.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    backup: bool,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            backup: false,
        }
    }

    /// Keep a timestamped copy of a document before it is replaced.
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    pub fn set_backup(&mut self, backup: bool) {
        self.backup = backup;
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path of the document addressed by `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if a key segment is empty or would escape its
    /// directory.
    pub fn path_for(&self, key: &StoreKey) -> Result<PathBuf, StoreError> {
        let mut path = self.root.join(key.scope.as_str());
        for segment in [&key.plugin, &key.namespace, &key.name] {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains(['/', '\\'])
            {
                return Err(StoreError::Backend(format!(
                    "invalid store key segment {segment:?} in {key}"
                )));
            }
            path.push(segment);
        }
        Ok(path)
    }

    async fn backup_existing(&self, path: &Path) -> Result<(), StoreError> {
        if !fs::try_exists(path).await? {
            return Ok(());
        }
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".bk-{secs}"));
        let backup_path = path.with_file_name(name);
        fs::copy(path, &backup_path).await?;
        debug!("backed up {} to {}", path.display(), backup_path.display());
        Ok(())
    }
}

impl ConfigStore for FileStore {
    async fn fetch(&self, key: &StoreKey) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn store(&self, key: &StoreKey, document: &ConfigDocument) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        if self.backup {
            self.backup_existing(&path).await?;
        }
        let content = serde_json::to_string_pretty(document)?;
        fs::write(&path, content).await?;
        info!("settings written to {}", path.display());
        Ok(())
    }

    async fn delete(&self, key: &StoreKey) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
