//! Cache entry bookkeeping

/// A single cached value plus the bookkeeping eviction relies on.
///
/// An entry past `expires_at` is logically absent: every lookup treats it as
/// a miss and purges it on touch.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    /// Creation time, Unix milliseconds.
    pub created_at: i64,
    /// Expiry time, Unix milliseconds. Invariant: `expires_at > created_at`.
    pub expires_at: i64,
    /// Number of hits since insertion (LFU ground truth).
    pub hit_count: u64,
    /// Budget-accounted payload size.
    pub(crate) weight: usize,
    /// Monotonic insertion order (FIFO ground truth, LFU tie-break).
    pub(crate) insert_seq: u64,
    /// Monotonic order of the most recent access (LRU ground truth).
    pub(crate) access_seq: u64,
}

impl<V> CacheEntry<V> {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        now_millis >= self.expires_at
    }
}
