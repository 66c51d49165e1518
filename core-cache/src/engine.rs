//! # Generic Keyed Cache Engine
//!
//! Size-, entry-, and time-bounded store with pluggable eviction.
//!
//! ## Semantics
//!
//! - Lookups never fail: a miss, an expired entry, or an oversized `set` are
//!   routine outcomes, not errors.
//! - An entry past its TTL is logically absent; any touch purges it.
//! - `set` evicts one victim at a time, chosen by the configured strategy,
//!   until both the byte budget and the entry bound hold. It never evicts
//!   more than necessary, and a single item larger than the whole byte
//!   budget is rejected outright (logged no-op).
//! - Overwriting a key fully retires the old entry's byte accounting before
//!   the new entry is added.
//!
//! ## Concurrency
//!
//! Internal state sits behind a `parking_lot::Mutex` that is never held
//! across an `.await`; snapshots are serialized inside the critical section
//! and written to the [`LocalStore`] after it is released.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_cache::{CacheConfig, KeyedCache};
//! use bridge_traits::time::SystemClock;
//! use std::sync::Arc;
//!
//! let cache: KeyedCache<bytes::Bytes> =
//!     KeyedCache::new(CacheConfig::audio(), Arc::new(SystemClock))?;
//! ```

use crate::config::{CacheConfig, EvictionStrategy};
use crate::entry::CacheEntry;
use crate::error::{CacheError, Result};
use crate::persist::{Snapshot, SnapshotEntry, ValueCodec};
use crate::stats::CacheStats;
use crate::weight::CacheWeight;
use bridge_traits::store::LocalStore;
use bridge_traits::time::Clock;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

struct PersistenceHandle<V> {
    store: Arc<dyn LocalStore>,
    codec: Arc<dyn ValueCodec<V>>,
}

struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    total_bytes: u64,
    next_seq: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl<V> CacheState<V> {
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.total_bytes -= entry.weight as u64;
        Some(entry)
    }
}

/// Generic keyed cache with byte/entry budgets, TTL expiry, and pluggable
/// LRU/LFU/FIFO eviction.
///
/// One instance is created per logical domain (audio, page content, AI
/// responses) by the composition root and shared via `Arc`.
pub struct KeyedCache<V> {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState<V>>,
    persistence: Option<PersistenceHandle<V>>,
}

impl<V> KeyedCache<V>
where
    V: Clone + CacheWeight + Send + Sync,
{
    /// Create a new cache instance.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate().map_err(CacheError::InvalidConfig)?;

        Ok(Self {
            config,
            clock,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                total_bytes: 0,
                next_seq: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
                expirations: 0,
            }),
            persistence: None,
        })
    }

    /// Attach a local store and codec for snapshot persistence.
    ///
    /// Snapshots are only written when the config also enables
    /// `persist_to_store`.
    pub fn with_store(mut self, store: Arc<dyn LocalStore>, codec: Arc<dyn ValueCodec<V>>) -> Self {
        self.persistence = Some(PersistenceHandle { store, codec });
        self
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the stored value if present and unexpired.
    ///
    /// Updates recency and frequency bookkeeping on hit. An expired entry is
    /// purged as a side effect and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.unix_timestamp_millis();

        enum Outcome<V> {
            Hit(V),
            Expired,
            Miss,
        }

        let outcome = {
            let mut state = self.state.lock();
            let seq = state.next_seq + 1;

            let outcome = match state.entries.get_mut(key) {
                Some(entry) if entry.is_expired(now) => Outcome::Expired,
                Some(entry) => {
                    entry.hit_count += 1;
                    entry.access_seq = seq;
                    Outcome::Hit(entry.value.clone())
                }
                None => Outcome::Miss,
            };

            match &outcome {
                Outcome::Hit(_) => {
                    state.next_seq = seq;
                    state.hits += 1;
                }
                Outcome::Expired => {
                    state.remove_entry(key);
                    state.expirations += 1;
                    state.misses += 1;
                }
                Outcome::Miss => {
                    state.misses += 1;
                }
            }

            outcome
        };

        match outcome {
            Outcome::Hit(value) => {
                // Hit count and recency changed, keep the snapshot current.
                self.persist().await;
                Some(value)
            }
            Outcome::Expired => {
                debug!(namespace = %self.config.namespace, key, "expired entry purged on get");
                self.persist().await;
                None
            }
            Outcome::Miss => None,
        }
    }

    /// Insert a value under the default TTL.
    pub async fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, None).await
    }

    /// Insert a value, optionally overriding the configured TTL.
    ///
    /// A value whose weight alone exceeds the byte budget is rejected as a
    /// logged no-op; callers needing confirmation can check `has` afterward.
    pub async fn set_with_ttl(&self, key: &str, value: V, ttl: Option<Duration>) {
        let weight = value.weight_bytes();
        if weight as u64 > self.config.max_bytes {
            warn!(
                namespace = %self.config.namespace,
                key,
                weight,
                max_bytes = self.config.max_bytes,
                "item exceeds cache byte budget, not stored"
            );
            return;
        }

        let now = self.clock.unix_timestamp_millis();
        let ttl = ttl.unwrap_or(self.config.ttl);

        {
            let mut state = self.state.lock();

            // Expired entries are dead weight; drop them before considering
            // live victims.
            let expired: Vec<String> = state
                .entries
                .values()
                .filter(|e| e.is_expired(now))
                .map(|e| e.key.clone())
                .collect();
            for stale in expired {
                state.remove_entry(&stale);
                state.expirations += 1;
            }

            // Overwrite retires the previous entry's accounting first.
            state.remove_entry(key);

            while state.total_bytes + weight as u64 > self.config.max_bytes
                || state.entries.len() >= self.config.max_entries
            {
                let Some(victim) = pick_victim(&state.entries, self.config.eviction_strategy)
                else {
                    break;
                };
                state.remove_entry(&victim);
                state.evictions += 1;
                debug!(
                    namespace = %self.config.namespace,
                    key = %victim,
                    strategy = ?self.config.eviction_strategy,
                    "evicted cache entry"
                );
            }

            state.next_seq += 1;
            let seq = state.next_seq;
            state.total_bytes += weight as u64;
            state.entries.insert(
                key.to_string(),
                CacheEntry {
                    key: key.to_string(),
                    value,
                    created_at: now,
                    expires_at: now + ttl.as_millis() as i64,
                    hit_count: 0,
                    weight,
                    insert_seq: seq,
                    access_seq: seq,
                },
            );
        }

        self.persist().await;
    }

    /// Remove an entry. Returns whether anything was removed.
    pub async fn delete(&self, key: &str) -> bool {
        let removed = {
            let mut state = self.state.lock();
            state.remove_entry(key).is_some()
        };

        if removed {
            self.persist().await;
        }
        removed
    }

    /// Expiry-aware presence check that does not touch recency or frequency.
    ///
    /// An expired entry is still purged, matching `get`.
    pub async fn has(&self, key: &str) -> bool {
        enum Presence {
            Missing,
            Live,
            Expired,
        }

        let now = self.clock.unix_timestamp_millis();
        let presence = {
            let mut state = self.state.lock();
            match state.entries.get(key) {
                None => Presence::Missing,
                Some(entry) if entry.is_expired(now) => {
                    state.remove_entry(key);
                    state.expirations += 1;
                    Presence::Expired
                }
                Some(_) => Presence::Live,
            }
        };

        match presence {
            Presence::Live => true,
            Presence::Missing => false,
            Presence::Expired => {
                self.persist().await;
                false
            }
        }
    }

    /// Empty the store and drop the persisted snapshot, if any.
    pub async fn clear(&self) {
        {
            let mut state = self.state.lock();
            state.entries.clear();
            state.total_bytes = 0;
        }

        if let Some(persistence) = &self.persistence {
            if self.config.persist_to_store {
                if let Err(e) = persistence.store.remove_item(&self.config.namespace).await {
                    warn!(
                        namespace = %self.config.namespace,
                        error = %e,
                        "failed to remove persisted snapshot"
                    );
                }
            }
        }

        info!(namespace = %self.config.namespace, "cache cleared");
    }

    /// Cache-aside lookup: return the cached value, or invoke `fetcher`,
    /// store its result, and return it.
    ///
    /// The fetcher's error propagates untouched; nothing is cached on
    /// failure.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetcher: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        self.get_or_fetch_with_ttl(key, fetcher, None).await
    }

    /// [`Self::get_or_fetch`] with a TTL override for the stored value.
    pub async fn get_or_fetch_with_ttl<F, Fut, E>(
        &self,
        key: &str,
        fetcher: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let value = fetcher().await?;
        self.set_with_ttl(key, value.clone(), ttl).await;
        Ok(value)
    }

    /// Delete every key matching `pattern`. Returns the number removed.
    ///
    /// Used when upstream content changes and a whole class of derived
    /// entries must be dropped together (e.g., all pages of one document).
    pub async fn invalidate_pattern(&self, pattern: &Regex) -> usize {
        let removed = {
            let mut state = self.state.lock();
            let matching: Vec<String> = state
                .entries
                .keys()
                .filter(|k| pattern.is_match(k))
                .cloned()
                .collect();

            for key in &matching {
                state.remove_entry(key);
            }
            matching.len()
        };

        if removed > 0 {
            info!(
                namespace = %self.config.namespace,
                pattern = %pattern,
                removed,
                "invalidated entries by pattern"
            );
            self.persist().await;
        }
        removed
    }

    /// Best-effort parallel population of multiple keys.
    ///
    /// Keys already cached are skipped. A failure on one key never aborts
    /// the others; it is logged and swallowed.
    pub async fn warm<F, Fut, E>(&self, keys: &[String], fetcher: F)
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: std::fmt::Display,
    {
        futures::future::join_all(keys.iter().map(|key| {
            let fetcher = &fetcher;
            async move {
                if self.has(key).await {
                    return;
                }

                match fetcher(key.clone()).await {
                    Ok(value) => self.set(key, value).await,
                    Err(e) => {
                        warn!(
                            namespace = %self.config.namespace,
                            key = %key,
                            error = %e,
                            "cache warm fetch failed"
                        );
                    }
                }
            }
        }))
        .await;
    }

    /// Restore entries from the persisted snapshot, skipping anything
    /// expired or undecodable. Returns the number of entries restored.
    pub async fn rehydrate(&self) -> Result<usize> {
        let Some(persistence) = &self.persistence else {
            return Ok(0);
        };
        if !self.config.persist_to_store {
            return Ok(0);
        }

        let raw = persistence
            .store
            .get_item(&self.config.namespace)
            .await
            .map_err(|e| CacheError::Persistence(e.to_string()))?;
        let Some(raw) = raw else {
            return Ok(0);
        };

        let snapshot: Snapshot =
            serde_json::from_str(&raw).map_err(|e| CacheError::CorruptSnapshot(e.to_string()))?;

        let now = self.clock.unix_timestamp_millis();
        let mut restored = 0usize;

        {
            let mut state = self.state.lock();
            for persisted in snapshot.entries {
                if persisted.expires_at <= now {
                    continue;
                }
                let Some(encoded) = persisted.value else {
                    // Binary placeholder; the payload was never persisted.
                    continue;
                };
                let Some(value) = persistence.codec.decode(&encoded) else {
                    continue;
                };

                let weight = value.weight_bytes();
                if state.total_bytes + weight as u64 > self.config.max_bytes
                    || state.entries.len() >= self.config.max_entries
                {
                    break;
                }

                state.next_seq += 1;
                let seq = state.next_seq;
                state.total_bytes += weight as u64;
                state.entries.insert(
                    persisted.key.clone(),
                    CacheEntry {
                        key: persisted.key,
                        value,
                        created_at: persisted.created_at,
                        expires_at: persisted.expires_at,
                        hit_count: persisted.hit_count,
                        weight,
                        insert_seq: seq,
                        access_seq: seq,
                    },
                );
                restored += 1;
            }
        }

        info!(
            namespace = %self.config.namespace,
            restored,
            "rehydrated cache from snapshot"
        );
        Ok(restored)
    }

    /// Point-in-time statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            total_bytes: state.total_bytes,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            expirations: state.expirations,
            captured_at: self.clock.unix_timestamp_millis(),
        }
    }

    /// Number of entries currently stored (including not-yet-purged expired
    /// entries).
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes currently accounted.
    pub fn total_bytes(&self) -> u64 {
        self.state.lock().total_bytes
    }

    /// Rewrite the snapshot if persistence is attached and enabled.
    async fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        if !self.config.persist_to_store {
            return;
        }

        let json = {
            let state = self.state.lock();
            let snapshot = Snapshot {
                entries: state
                    .entries
                    .values()
                    .map(|entry| SnapshotEntry {
                        key: entry.key.clone(),
                        value: persistence.codec.encode(&entry.value),
                        created_at: entry.created_at,
                        expires_at: entry.expires_at,
                        hit_count: entry.hit_count,
                    })
                    .collect(),
                total_bytes: state.total_bytes,
            };
            serde_json::to_string(&snapshot)
        };

        match json {
            Ok(json) => {
                if let Err(e) = persistence
                    .store
                    .set_item(&self.config.namespace, &json)
                    .await
                {
                    warn!(
                        namespace = %self.config.namespace,
                        error = %e,
                        "failed to persist cache snapshot"
                    );
                }
            }
            Err(e) => {
                warn!(
                    namespace = %self.config.namespace,
                    error = %e,
                    "failed to serialize cache snapshot"
                );
            }
        }
    }
}

/// Pick the eviction victim per strategy. Ties are deterministic: LFU falls
/// back to insertion order.
fn pick_victim<V>(
    entries: &HashMap<String, CacheEntry<V>>,
    strategy: EvictionStrategy,
) -> Option<String> {
    let victim = match strategy {
        EvictionStrategy::LeastRecentlyUsed => entries.values().min_by_key(|e| e.access_seq),
        EvictionStrategy::LeastFrequentlyUsed => {
            entries.values().min_by_key(|e| (e.hit_count, e.insert_seq))
        }
        EvictionStrategy::FirstInFirstOut => entries.values().min_by_key(|e| e.insert_seq),
    };

    victim.map(|e| e.key.clone())
}
