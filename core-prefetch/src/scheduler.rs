//! Forward-window page audio pre-generation
//!
//! When the reading position moves, [`PrefetchScheduler::schedule`] looks a
//! few pages ahead, skips anything already cached or already being fetched,
//! and spawns background generation for the rest. Completions land in the
//! audio cache; failures are logged and swallowed. Late completions after
//! the reader has moved on simply populate the cache for next time.

use crate::pending::PendingFetches;
use async_trait::async_trait;
use bytes::Bytes;
use core_cache::{AudioCache, AudioRequest};
use core_network::NetworkHealthMonitor;
use core_recovery::RawFailure;
use std::sync::Arc;
use tracing::{debug, warn};

/// Produces one synthesized audio segment. Implementations wrap whatever
/// transport actually talks to the synthesis backend.
#[async_trait]
pub trait SegmentGenerator: Send + Sync {
    async fn generate(&self, request: &AudioRequest) -> Result<Bytes, RawFailure>;
}

/// Supplies page text for look-ahead. Page indices are zero-based.
pub trait PageContentSource: Send + Sync {
    fn page_text(&self, index: u32) -> Option<String>;
    fn page_count(&self) -> u32;
}

/// Voice parameters applied to every pre-generated segment.
#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub voice: String,
    pub rate: String,
    pub pitch: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            voice: "en-US-AriaNeural".to_string(),
            rate: "+0%".to_string(),
            pitch: "+0Hz".to_string(),
        }
    }
}

impl SpeechSettings {
    fn request_for(&self, text: String) -> AudioRequest {
        AudioRequest::new(text, self.voice.clone())
            .with_rate(self.rate.clone())
            .with_pitch(self.pitch.clone())
    }
}

/// Scheduler tuning.
#[derive(Debug, Clone)]
pub struct PrefetchConfig {
    /// Pages ahead of the current position to pre-generate.
    pub window: u32,
    pub speech: SpeechSettings,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            window: 3,
            speech: SpeechSettings::default(),
        }
    }
}

impl PrefetchConfig {
    pub fn with_window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    pub fn with_speech(mut self, speech: SpeechSettings) -> Self {
        self.speech = speech;
        self
    }
}

/// Background audio pre-generation for upcoming pages.
pub struct PrefetchScheduler {
    cache: Arc<AudioCache>,
    monitor: Arc<NetworkHealthMonitor>,
    generator: Arc<dyn SegmentGenerator>,
    pending: PendingFetches,
    config: PrefetchConfig,
}

impl PrefetchScheduler {
    pub fn new(
        cache: Arc<AudioCache>,
        monitor: Arc<NetworkHealthMonitor>,
        generator: Arc<dyn SegmentGenerator>,
        pending: PendingFetches,
        config: PrefetchConfig,
    ) -> Self {
        Self {
            cache,
            monitor,
            generator,
            pending,
            config,
        }
    }

    pub fn pending(&self) -> &PendingFetches {
        &self.pending
    }

    /// Schedule generation for the window after `position`. Returns the
    /// number of background tasks spawned; pages that are cached, already
    /// in flight, or empty are skipped. Does nothing while the connection
    /// is too poor for speculative work.
    pub async fn schedule(&self, source: &dyn PageContentSource, position: u32) -> usize {
        if self.monitor.should_use_offline_mode() {
            debug!(position, "deferring prefetch while offline or degraded");
            return 0;
        }

        let last = position
            .saturating_add(self.config.window)
            .min(source.page_count().saturating_sub(1));
        let mut spawned = 0;

        for page in position.saturating_add(1)..=last {
            let text = match source.page_text(page) {
                Some(text) if !text.trim().is_empty() => text,
                _ => continue,
            };

            let request = self.config.speech.request_for(text);
            let key = request.cache_key();

            if self.cache.has(&key).await {
                continue;
            }
            let Some(guard) = self.pending.begin(&key) else {
                continue;
            };

            let cache = self.cache.clone();
            let generator = self.generator.clone();
            tokio::spawn(async move {
                let _guard = guard;
                match generator.generate(&request).await {
                    Ok(audio) => {
                        cache.set(&key, audio).await;
                        debug!(page, key = %key, "pre-generated audio segment");
                    }
                    Err(failure) => {
                        warn!(page, ?failure, "audio pre-generation failed");
                    }
                }
            });
            spawned += 1;
        }

        if spawned > 0 {
            debug!(position, spawned, "scheduled audio pre-generation");
        }
        spawned
    }
}
