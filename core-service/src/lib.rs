//! # Reader Core Composition Root
//!
//! Wires host-provided bridge implementations (HTTP, key-value store, clock)
//! into the caching, network-health, recovery, and pre-fetch subsystems and
//! hands out shared handles. Desktop apps enable the `desktop-shims` feature
//! for the `bridge-desktop` adapters; other hosts inject their own bridges.

pub mod error;
pub mod generator;

pub use error::{CoreError, Result};
pub use generator::HttpSegmentGenerator;

use bridge_traits::http::HttpClient;
use bridge_traits::store::LocalStore;
use bridge_traits::time::Clock;
use bytes::Bytes;
use core_cache::{
    AiResponseCache, AudioCache, AudioRequest, CacheConfig, JsonCodec, KeyedCache, PageCache,
    PageContent, StringCodec,
};
use core_network::{MonitorConfig, NetworkHealthMonitor};
use core_prefetch::{
    PageContentSource, PendingFetches, PrefetchConfig, PrefetchScheduler, SegmentGenerator,
};
use core_recovery::{ErrorContext, ErrorKind, RecoveryConfig, RecoveryPolicy, Severity};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Aggregated handle to the bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub local_store: Arc<dyn LocalStore>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        local_store: Arc<dyn LocalStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http_client,
            local_store,
            clock,
        }
    }
}

/// Top-level tuning for every subsystem.
#[derive(Clone)]
pub struct CoreConfig {
    pub backend_url: String,
    pub monitor: MonitorConfig,
    pub recovery: RecoveryConfig,
    pub prefetch: PrefetchConfig,
    pub audio_cache: CacheConfig,
    pub page_cache: CacheConfig,
    pub ai_cache: CacheConfig,
}

impl CoreConfig {
    pub fn new(backend_url: impl Into<String>) -> Self {
        let backend_url = backend_url.into().trim_end_matches('/').to_string();
        Self {
            monitor: MonitorConfig::new(format!("{}/api/health", backend_url)),
            recovery: RecoveryConfig::default(),
            prefetch: PrefetchConfig::default(),
            audio_cache: CacheConfig::audio(),
            page_cache: CacheConfig::page_content(),
            ai_cache: CacheConfig::ai_response(),
            backend_url,
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct ReaderCore {
    deps: Arc<CoreDependencies>,
    audio_cache: Arc<AudioCache>,
    page_cache: Arc<PageCache>,
    ai_cache: Arc<AiResponseCache>,
    monitor: Arc<NetworkHealthMonitor>,
    recovery: Arc<RecoveryPolicy>,
    generator: Arc<dyn SegmentGenerator>,
    pending: PendingFetches,
    scheduler: Arc<PrefetchScheduler>,
}

impl ReaderCore {
    /// Build the core with the default HTTP-backed segment generator.
    ///
    /// # Errors
    ///
    /// Returns an error if any subsystem configuration fails validation.
    pub fn new(deps: CoreDependencies, config: CoreConfig) -> Result<Self> {
        let generator = Arc::new(HttpSegmentGenerator::new(
            deps.http_client.clone(),
            &config.backend_url,
        ));
        Self::with_generator(deps, config, generator)
    }

    /// Build the core with an injected segment generator. Hosts with their
    /// own synthesis transport (or tests) use this entry point.
    pub fn with_generator(
        deps: CoreDependencies,
        config: CoreConfig,
        generator: Arc<dyn SegmentGenerator>,
    ) -> Result<Self> {
        let deps = Arc::new(deps);

        let audio_cache = Arc::new(KeyedCache::new(config.audio_cache, deps.clock.clone())?);
        let page_cache = Arc::new(
            KeyedCache::new(config.page_cache, deps.clock.clone())?.with_store(
                deps.local_store.clone(),
                Arc::new(JsonCodec::<PageContent>::new()),
            ),
        );
        let ai_cache = Arc::new(
            KeyedCache::new(config.ai_cache, deps.clock.clone())?
                .with_store(deps.local_store.clone(), Arc::new(StringCodec)),
        );

        let monitor = Arc::new(
            NetworkHealthMonitor::new(deps.http_client.clone(), deps.clock.clone(), config.monitor)
                .map_err(CoreError::InitializationFailed)?,
        );
        let recovery = Arc::new(RecoveryPolicy::new(config.recovery));
        let pending = PendingFetches::new();
        let scheduler = Arc::new(PrefetchScheduler::new(
            audio_cache.clone(),
            monitor.clone(),
            generator.clone(),
            pending.clone(),
            config.prefetch,
        ));

        Ok(Self {
            deps,
            audio_cache,
            page_cache,
            ai_cache,
            monitor,
            recovery,
            generator,
            pending,
            scheduler,
        })
    }

    /// Rehydrate persisted caches and spawn the health monitor loop.
    /// The returned handle resolves when `cancel` fires.
    pub async fn start(&self, cancel: CancellationToken) -> JoinHandle<()> {
        for (name, restored) in [
            ("pages", self.page_cache.rehydrate().await),
            ("ai responses", self.ai_cache.rehydrate().await),
        ] {
            match restored {
                Ok(count) if count > 0 => info!(cache = name, count, "rehydrated cache"),
                Ok(_) => {}
                Err(err) => warn!(cache = name, %err, "cache rehydration failed"),
            }
        }

        let monitor = self.monitor.clone();
        tokio::spawn(async move { monitor.run(cancel).await })
    }

    /// Foreground cache-aside path for one page's audio: serve from cache,
    /// otherwise generate under the recovery policy. Degraded connections
    /// fail fast instead of queueing retries.
    pub async fn page_audio(
        &self,
        request: &AudioRequest,
    ) -> std::result::Result<Bytes, ErrorContext> {
        let key = request.cache_key();
        if let Some(audio) = self.audio_cache.get(&key).await {
            return Ok(audio);
        }

        if !self.monitor.should_retry() {
            return Err(ErrorContext::new(
                ErrorKind::Network,
                Severity::Warning,
                "Audio unavailable while offline",
                false,
            )
            .with_suggestion("Reconnect to generate audio for this page"));
        }

        // Best-effort claim so background pre-generation of the same key is
        // skipped while we work; an already-held marker does not block the
        // foreground path.
        let _pending = self.pending.begin(&key);

        let generator = self.generator.clone();
        let audio = self
            .recovery
            .run_with_recovery(|| {
                let generator = generator.clone();
                let request = request.clone();
                async move { generator.generate(&request).await }
            })
            .await?;

        self.audio_cache.set(&key, audio.clone()).await;
        Ok(audio)
    }

    /// Pre-generate audio for the pages after `position`.
    pub async fn prefetch_from(&self, source: &dyn PageContentSource, position: u32) -> usize {
        self.scheduler.schedule(source, position).await
    }

    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        self.deps.clone()
    }

    pub fn audio_cache(&self) -> Arc<AudioCache> {
        self.audio_cache.clone()
    }

    pub fn page_cache(&self) -> Arc<PageCache> {
        self.page_cache.clone()
    }

    pub fn ai_cache(&self) -> Arc<AiResponseCache> {
        self.ai_cache.clone()
    }

    pub fn monitor(&self) -> Arc<NetworkHealthMonitor> {
        self.monitor.clone()
    }

    pub fn recovery(&self) -> Arc<RecoveryPolicy> {
        self.recovery.clone()
    }

    pub fn scheduler(&self) -> Arc<PrefetchScheduler> {
        self.scheduler.clone()
    }
}
