//! File-backed Key-Value Store
//!
//! A single flat JSON object on disk, mirroring the web `localStorage`
//! surface so cache snapshots persist across sessions on desktop. Writes
//! replace the whole file through a temporary-file rename, so a crash
//! mid-write never leaves a half-written store behind.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    store::LocalStore,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// JSON-file-backed implementation of [`LocalStore`].
pub struct JsonFileStore {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or create) a store at the given path. An unreadable or corrupt
    /// file is treated as empty rather than fatal; the next write replaces
    /// it.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let items = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(items) => items,
                Err(err) => {
                    warn!(path = ?path, %err, "Store file is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(BridgeError::Io(err)),
        };

        debug!(path = ?path, keys = items.len(), "Opened file store");

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Open a store at the platform's default data location.
    pub async fn open_default() -> Result<Self> {
        let path = Self::default_path().ok_or_else(|| {
            BridgeError::NotAvailable("platform data directory".to_string())
        })?;
        Self::open(path).await
    }

    /// Platform data directory plus the application's store file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("reader-workspace").join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self, items: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_vec_pretty(items)
            .map_err(|e| BridgeError::OperationFailed(format!("Serialization failed: {}", e)))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await.map_err(BridgeError::Io)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(BridgeError::Io)?;
        Ok(())
    }
}

#[async_trait]
impl LocalStore for JsonFileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().await;
        items.insert(key.to_string(), value.to_string());
        self.flush(&items).await
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().await;
        if items.remove(key).is_some() {
            self.flush(&items).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_roundtrip_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.set_item("cache:pages", "{\"entries\":[]}").await.unwrap();
        }

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            store.get_item("cache:pages").await.unwrap(),
            Some("{\"entries\":[]}".to_string())
        );

        store.remove_item("cache:pages").await.unwrap();
        assert_eq!(store.get_item("cache:pages").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        tokio::fs::write(&path, b"not json at all").await.unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(store.get_item("anything").await.unwrap(), None);

        // A write replaces the corrupt file with a valid one.
        store.set_item("k", "v").await.unwrap();
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(raw.contains("\"k\""));
    }

    #[tokio::test]
    async fn test_remove_missing_key_does_not_rewrite() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json"))
            .await
            .unwrap();

        assert!(store.remove_item("missing").await.is_ok());
        // Nothing was ever written.
        assert!(!store.path().exists());
    }
}
