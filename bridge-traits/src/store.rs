//! Local Key-Value Store Abstraction
//!
//! A flat string key-value store used to persist cache snapshots across
//! sessions. Deliberately mirrors the web `localStorage` surface so the
//! same snapshot format works on every host.

use async_trait::async_trait;
use std::collections::HashMap;
use parking_lot::Mutex;

use crate::error::Result;

/// Flat string key-value persistence.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::store::LocalStore;
///
/// async fn save_snapshot(store: &dyn LocalStore, json: &str) -> Result<()> {
///     store.set_item("cache:audio", json).await
/// }
/// ```
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Retrieve a stored value.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous value for the key.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryLocalStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (test helper).
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .items
            .lock()
            .get(key)
            .cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().remove(key);
        Ok(())
    }
}
