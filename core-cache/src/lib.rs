//! # Keyed Cache Engine
//!
//! Client-side caching for the reader core: a generic size/entry/time-bounded
//! store with pluggable eviction, plus the audio / page-content / AI-response
//! specializations built on it.
//!
//! ## Overview
//!
//! Key features:
//! - Byte and entry budgets enforced together, with LRU/LFU/FIFO eviction
//! - TTL expiry: entries past their deadline are treated as misses and purged
//!   on touch
//! - Cache-aside (`get_or_fetch`), pattern invalidation, and best-effort
//!   warming
//! - Optional flat JSON snapshot persistence through the host
//!   [`LocalStore`](bridge_traits::store::LocalStore)
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │            KeyedCache<V>               │
//! │  - get() / set() / delete() / has()    │
//! │  - get_or_fetch() / warm()             │
//! │  - invalidate_pattern()                │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> EvictionStrategy (LRU/LFU/FIFO)
//!          ├──> ValueCodec (snapshot encoding)
//!          └──> LocalStore (host persistence)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_cache::{AudioRequest, CacheConfig, KeyedCache};
//! use bridge_traits::time::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), core_cache::CacheError> {
//! let cache = KeyedCache::new(CacheConfig::audio(), Arc::new(SystemClock))?;
//! let key = AudioRequest::new("Call me Ishmael.", "pt-BR-Antonio").cache_key();
//!
//! if let Some(audio) = cache.get(&key).await {
//!     // play from cache
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domains;
pub mod engine;
pub mod entry;
pub mod error;
pub mod persist;
pub mod stats;
pub mod weight;

// Re-export commonly used types
pub use config::{CacheConfig, EvictionStrategy};
pub use domains::{
    AiRequest, AiResponseCache, AudioCache, AudioRequest, PageCache, PageContent, PageRequest,
};
pub use engine::KeyedCache;
pub use entry::CacheEntry;
pub use error::{CacheError, Result};
pub use persist::{JsonCodec, OpaqueBinaryCodec, StringCodec, ValueCodec};
pub use stats::CacheStats;
pub use weight::{json_weight, CacheWeight};
