//! Cache statistics and monitoring

use serde::{Deserialize, Serialize};

/// Point-in-time statistics for one cache instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of live entries
    pub entries: usize,

    /// Total bytes used by live entries
    pub total_bytes: u64,

    /// Lookups that returned a value
    pub hits: u64,

    /// Lookups that found nothing (including expired entries)
    pub misses: u64,

    /// Entries removed to satisfy the capacity bounds
    pub evictions: u64,

    /// Entries purged because their TTL elapsed
    pub expirations: u64,

    /// Timestamp when stats were captured, Unix milliseconds
    pub captured_at: i64,
}

impl CacheStats {
    /// Cache usage as a percentage of the byte budget.
    pub fn usage_percentage(&self, max_bytes: u64) -> f64 {
        if max_bytes == 0 {
            return 0.0;
        }

        (self.total_bytes as f64 / max_bytes as f64) * 100.0
    }

    /// Returns true if the cache is near capacity (>90%).
    pub fn is_near_capacity(&self, max_bytes: u64) -> bool {
        self.usage_percentage(max_bytes) > 90.0
    }

    /// Fraction of lookups served from cache, in [0, 1].
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }

        self.hits as f64 / lookups as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_percentage() {
        let stats = CacheStats {
            total_bytes: 900,
            ..Default::default()
        };

        assert_eq!(stats.usage_percentage(1000), 90.0);
        assert_eq!(stats.usage_percentage(0), 0.0);
        assert!(!stats.is_near_capacity(1000));
        assert!(stats.is_near_capacity(990));
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };

        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
