//! Cache configuration and eviction strategies

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a keyed cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum total payload size in bytes (default: 64MB)
    pub max_bytes: u64,

    /// Maximum number of entries (default: 256)
    pub max_entries: usize,

    /// Default time-to-live applied to entries without an override
    pub ttl: Duration,

    /// Strategy used to pick a victim when capacity is exceeded
    pub eviction_strategy: EvictionStrategy,

    /// Serialize a flat snapshot to the attached local store on mutation
    pub persist_to_store: bool,

    /// Key under which the snapshot is persisted; also prefixes log output
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: 64 * 1024 * 1024, // 64MB
            max_entries: 256,
            ttl: Duration::from_secs(30 * 60),
            eviction_strategy: EvictionStrategy::LeastRecentlyUsed,
            persist_to_store: false,
            namespace: "cache".to_string(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tuned configuration for synthesized speech segments.
    ///
    /// Audio payloads are large and expensive to regenerate, so they get the
    /// biggest byte budget and the longest TTL. Binary payloads stay
    /// memory-only; see `OpaqueBinaryCodec`.
    pub fn audio() -> Self {
        Self {
            max_bytes: 128 * 1024 * 1024,
            max_entries: 64,
            ttl: Duration::from_secs(6 * 60 * 60),
            eviction_strategy: EvictionStrategy::LeastRecentlyUsed,
            persist_to_store: false,
            namespace: "cache:audio".to_string(),
        }
    }

    /// Tuned configuration for extracted document pages.
    pub fn page_content() -> Self {
        Self {
            max_bytes: 32 * 1024 * 1024,
            max_entries: 512,
            ttl: Duration::from_secs(60 * 60),
            eviction_strategy: EvictionStrategy::LeastRecentlyUsed,
            persist_to_store: true,
            namespace: "cache:pages".to_string(),
        }
    }

    /// Tuned configuration for AI responses.
    ///
    /// LFU-biased so frequently repeated queries (chapter summaries, recurring
    /// questions) outlive one-off prompts.
    pub fn ai_response() -> Self {
        Self {
            max_bytes: 8 * 1024 * 1024,
            max_entries: 128,
            ttl: Duration::from_secs(24 * 60 * 60),
            eviction_strategy: EvictionStrategy::LeastFrequentlyUsed,
            persist_to_store: true,
            namespace: "cache:ai".to_string(),
        }
    }

    /// Set maximum total payload size.
    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    /// Set maximum entry count.
    pub fn with_max_entries(mut self, count: usize) -> Self {
        self.max_entries = count;
        self
    }

    /// Set default TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set eviction strategy.
    pub fn with_eviction_strategy(mut self, strategy: EvictionStrategy) -> Self {
        self.eviction_strategy = strategy;
        self
    }

    /// Enable or disable snapshot persistence.
    pub fn with_persistence(mut self, enabled: bool) -> Self {
        self.persist_to_store = enabled;
        self
    }

    /// Set the snapshot namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_bytes == 0 {
            return Err("max_bytes must be greater than 0".to_string());
        }

        if self.max_entries == 0 {
            return Err("max_entries must be at least 1".to_string());
        }

        if self.ttl.is_zero() {
            return Err("ttl must be non-zero".to_string());
        }

        if self.namespace.is_empty() {
            return Err("namespace cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Strategy for evicting entries when the cache is over budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionStrategy {
    /// Remove the entry whose most recent access is oldest
    LeastRecentlyUsed,

    /// Remove the entry with the lowest hit count; ties broken by insertion order
    LeastFrequentlyUsed,

    /// Remove the oldest-inserted entry regardless of access pattern
    FirstInFirstOut,
}

impl EvictionStrategy {
    /// Returns a human-readable description of the strategy.
    pub fn description(&self) -> &'static str {
        match self {
            EvictionStrategy::LeastRecentlyUsed => {
                "Remove the entry whose most recent access is oldest"
            }
            EvictionStrategy::LeastFrequentlyUsed => "Remove the entry with the lowest hit count",
            EvictionStrategy::FirstInFirstOut => "Remove the oldest-inserted entry",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_bytes, 64 * 1024 * 1024);
        assert_eq!(config.max_entries, 256);
        assert_eq!(
            config.eviction_strategy,
            EvictionStrategy::LeastRecentlyUsed
        );
        assert!(!config.persist_to_store);
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::new()
            .with_max_bytes(1024)
            .with_max_entries(2)
            .with_eviction_strategy(EvictionStrategy::FirstInFirstOut)
            .with_namespace("cache:test");

        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.max_entries, 2);
        assert_eq!(config.eviction_strategy, EvictionStrategy::FirstInFirstOut);
        assert_eq!(config.namespace, "cache:test");
    }

    #[test]
    fn test_config_validation() {
        assert!(CacheConfig::default().validate().is_ok());
        assert!(CacheConfig::audio().validate().is_ok());
        assert!(CacheConfig::page_content().validate().is_ok());
        assert!(CacheConfig::ai_response().validate().is_ok());

        assert!(CacheConfig::default().with_max_bytes(0).validate().is_err());
        assert!(CacheConfig::default()
            .with_max_entries(0)
            .validate()
            .is_err());
        assert!(CacheConfig::default()
            .with_ttl(Duration::ZERO)
            .validate()
            .is_err());
        assert!(CacheConfig::default().with_namespace("").validate().is_err());
    }

    #[test]
    fn test_eviction_strategy_descriptions() {
        assert!(!EvictionStrategy::LeastRecentlyUsed.description().is_empty());
        assert!(!EvictionStrategy::LeastFrequentlyUsed
            .description()
            .is_empty());
        assert!(!EvictionStrategy::FirstInFirstOut.description().is_empty());
    }
}
