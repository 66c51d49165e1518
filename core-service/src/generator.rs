//! Default HTTP-backed speech segment generator

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bytes::Bytes;
use core_cache::AudioRequest;
use core_prefetch::SegmentGenerator;
use core_recovery::RawFailure;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    voice: &'a str,
    rate: &'a str,
    pitch: &'a str,
}

/// Generates audio by POSTing synthesis parameters to the backend's
/// text-to-speech endpoint and returning the raw audio body.
pub struct HttpSegmentGenerator {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    timeout: Duration,
}

impl HttpSegmentGenerator {
    pub fn new(http_client: Arc<dyn HttpClient>, backend_url: &str) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/api/tts", backend_url.trim_end_matches('/')),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SegmentGenerator for HttpSegmentGenerator {
    async fn generate(&self, request: &AudioRequest) -> Result<Bytes, RawFailure> {
        let body = SynthesisBody {
            text: &request.text,
            voice: &request.voice,
            rate: &request.rate,
            pitch: &request.pitch,
        };

        let http_request = HttpRequest::new(HttpMethod::Post, &self.endpoint)
            .json(&body)
            .map_err(RawFailure::from)?
            .timeout(self.timeout);

        let response = self
            .http_client
            .execute(http_request)
            .await
            .map_err(RawFailure::from)?;

        if !response.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RawFailure::Http {
                status: response.status,
                body,
            });
        }

        Ok(response.body)
    }
}
