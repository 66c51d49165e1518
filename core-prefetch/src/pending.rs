//! In-flight fetch registry
//!
//! One marker per cache key; the first caller to [`PendingFetches::begin`]
//! gets a guard, everyone else gets `None` until the guard drops. Dropping
//! is the only way to clear a marker, so a panicking or failing task can
//! never wedge its key.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Registry of cache keys with a fetch currently in flight.
#[derive(Clone, Default)]
pub struct PendingFetches {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl PendingFetches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a key. Returns `None` when another fetch already holds it.
    pub fn begin(&self, key: &str) -> Option<PendingGuard> {
        let mut keys = self.inner.lock();
        if keys.contains(key) {
            return None;
        }
        keys.insert(key.to_string());
        Some(PendingGuard {
            registry: self.inner.clone(),
            key: key.to_string(),
        })
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Ownership of one in-flight key. Clears the marker on drop.
pub struct PendingGuard {
    registry: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl PendingGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.registry.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_refused_until_drop() {
        let pending = PendingFetches::new();

        let guard = pending.begin("audio:abc");
        assert!(guard.is_some());
        assert!(pending.begin("audio:abc").is_none());
        assert!(pending.is_pending("audio:abc"));

        drop(guard);
        assert!(!pending.is_pending("audio:abc"));
        assert!(pending.begin("audio:abc").is_some());
    }

    #[test]
    fn test_keys_are_independent() {
        let pending = PendingFetches::new();

        let _a = pending.begin("audio:a");
        assert!(pending.begin("audio:b").is_some());
        assert_eq!(pending.len(), 1); // b's guard already dropped
    }
}
