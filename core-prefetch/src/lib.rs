//! # Pre-fetch Scheduling
//!
//! Speculative audio generation for the pages a reader is about to hit.
//! A [`PendingFetches`] registry de-duplicates concurrent work per cache
//! key, and the [`PrefetchScheduler`] fills the audio cache for a forward
//! window of pages, deferring whenever the connection is degraded.

pub mod pending;
pub mod scheduler;

pub use pending::{PendingFetches, PendingGuard};
pub use scheduler::{
    PageContentSource, PrefetchConfig, PrefetchScheduler, SegmentGenerator, SpeechSettings,
};
