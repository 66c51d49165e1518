//! Tests for the composition root and the foreground audio path

use async_trait::async_trait;
use bridge_traits::error::BridgeError;
use bridge_traits::http::{HttpMethod, HttpResponse};
use bridge_traits::store::MemoryLocalStore;
use bridge_traits::time::ManualClock;
use bridge_traits::MockHttpClient;
use bytes::Bytes;
use core_cache::AudioRequest;
use core_prefetch::SegmentGenerator;
use core_recovery::{ErrorKind, RawFailure, RecoveryConfig};
use core_service::{CoreConfig, CoreDependencies, HttpSegmentGenerator, ReaderCore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingGenerator {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingGenerator {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SegmentGenerator for CountingGenerator {
    async fn generate(&self, request: &AudioRequest) -> Result<Bytes, RawFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(RawFailure::Http {
                status: 500,
                body: "synthesis backend down".to_string(),
            })
        } else {
            Ok(Bytes::from(format!("mp3:{}", request.text)))
        }
    }
}

fn deps_with(http: MockHttpClient) -> CoreDependencies {
    CoreDependencies::new(
        Arc::new(http),
        Arc::new(MemoryLocalStore::new()),
        Arc::new(ManualClock::default()),
    )
}

fn core_with(generator: Arc<CountingGenerator>, http: MockHttpClient) -> ReaderCore {
    ReaderCore::with_generator(
        deps_with(http),
        CoreConfig::new("http://localhost:8000"),
        generator,
    )
    .unwrap()
}

#[tokio::test]
async fn page_audio_generates_then_serves_from_cache() {
    let generator = CountingGenerator::ok();
    let core = core_with(generator.clone(), MockHttpClient::new());
    let request = AudioRequest::new("call me ishmael", "en-US-AriaNeural");

    let first = core.page_audio(&request).await.unwrap();
    assert_eq!(first, Bytes::from_static(b"mp3:call me ishmael"));

    let second = core.page_audio(&request).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn page_audio_retries_under_the_recovery_policy() {
    let generator = CountingGenerator::failing();
    let core = core_with(generator.clone(), MockHttpClient::new());
    let request = AudioRequest::new("page one", "en-US-AriaNeural");

    let err = core.page_audio(&request).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::BackendUnavailable);
    // One initial attempt plus the configured number of retries.
    assert_eq!(
        generator.calls(),
        RecoveryConfig::default().max_attempts as usize + 1
    );
    assert!(core.audio_cache().is_empty());
}

#[tokio::test]
async fn page_audio_fails_fast_while_offline() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .returning(|_| Err(BridgeError::ConnectionRefused("probe".to_string())));

    let generator = CountingGenerator::ok();
    let core = core_with(generator.clone(), http);

    for _ in 0..3 {
        core.monitor().probe_once().await;
    }

    let err = core
        .page_audio(&AudioRequest::new("text", "voice"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(!err.retryable);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn http_generator_posts_to_the_tts_endpoint() {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|request| {
            request.method == HttpMethod::Post
                && request.url == "http://localhost:8000/api/tts"
                && request.headers.get("Content-Type").map(String::as_str)
                    == Some("application/json")
        })
        .returning(|_| {
            Ok(HttpResponse {
                status: 200,
                headers: HashMap::new(),
                body: Bytes::from_static(b"mp3 bytes"),
            })
        });

    let generator = HttpSegmentGenerator::new(Arc::new(http), "http://localhost:8000/");
    let audio = generator
        .generate(&AudioRequest::new("hello", "en-US-AriaNeural"))
        .await
        .unwrap();
    assert_eq!(audio, Bytes::from_static(b"mp3 bytes"));
}

#[tokio::test]
async fn http_generator_surfaces_status_failures() {
    let mut http = MockHttpClient::new();
    http.expect_execute().returning(|_| {
        Ok(HttpResponse {
            status: 413,
            headers: HashMap::new(),
            body: Bytes::from_static(b"too large"),
        })
    });

    let generator = HttpSegmentGenerator::new(Arc::new(http), "http://localhost:8000");
    let err = generator
        .generate(&AudioRequest::new("hello", "voice"))
        .await
        .unwrap_err();
    assert!(matches!(err, RawFailure::Http { status: 413, .. }));
}
