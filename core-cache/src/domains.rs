//! Domain specializations
//!
//! Each reading-domain cache pairs the generic engine with a deterministic
//! key-derivation function and a tuned [`CacheConfig`]:
//!
//! - audio segments: key over `(text, voice, rate, pitch)`, large byte
//!   budget, long TTL, LRU
//! - document pages: key over `(document, page_number)`, LRU
//! - AI responses: key over `(prompt, context)`, small LFU-biased budget
//!
//! Key derivation must be pure: two semantically identical requests always
//! produce the same key, and changing any one input changes the key.

use crate::engine::KeyedCache;
use crate::weight::{json_weight, CacheWeight};
use bytes::Bytes;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Synthesized speech cache: binary MP3/PCM payloads.
pub type AudioCache = KeyedCache<Bytes>;

/// Extracted page-content cache.
pub type PageCache = KeyedCache<PageContent>;

/// AI summarization/answer cache: plain text responses.
pub type AiResponseCache = KeyedCache<String>;

/// Inputs identifying one speech-synthesis result.
///
/// `rate` and `pitch` use the backend's wire format (`"+0%"`, `"+0Hz"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRequest {
    pub text: String,
    pub voice: String,
    pub rate: String,
    pub pitch: String,
}

impl AudioRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            rate: "+0%".to_string(),
            pitch: "+0Hz".to_string(),
        }
    }

    pub fn with_rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = rate.into();
        self
    }

    pub fn with_pitch(mut self, pitch: impl Into<String>) -> Self {
        self.pitch = pitch.into();
        self
    }

    /// Deterministic cache key over all synthesis inputs.
    pub fn cache_key(&self) -> String {
        let digest = sha256_hex(&format!(
            "{}:{}:{}:{}",
            self.text, self.voice, self.rate, self.pitch
        ));
        format!("audio:{}", digest)
    }
}

/// Inputs identifying one extracted document page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub document: String,
    pub page_number: u32,
}

impl PageRequest {
    pub fn new(document: impl Into<String>, page_number: u32) -> Self {
        Self {
            document: document.into(),
            page_number,
        }
    }

    /// Human-readable key; document names are part of the key on purpose so
    /// pattern invalidation can target one document.
    pub fn cache_key(&self) -> String {
        format!("page:{}:{}", self.document, self.page_number)
    }

    /// Pattern matching every derived entry of one document, across page and
    /// audio-per-page namespaces.
    pub fn document_pattern(document: &str) -> Regex {
        // regex::escape keeps arbitrary filenames from being interpreted.
        let escaped = regex::escape(document);
        Regex::new(&format!("^page:{}:", escaped)).unwrap_or_else(|_| {
            // escape() output is always a valid literal pattern
            unreachable!("escaped document name must compile")
        })
    }
}

/// Extracted text of one page, as cached between renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub page_number: u32,
    pub text: String,
    pub word_count: usize,
}

impl PageContent {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        Self {
            page_number,
            text,
            word_count,
        }
    }
}

impl CacheWeight for PageContent {
    fn weight_bytes(&self) -> usize {
        json_weight(self)
    }
}

/// Inputs identifying one AI request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiRequest {
    pub prompt: String,
    pub context: Option<String>,
}

impl AiRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Deterministic cache key over prompt and optional context.
    pub fn cache_key(&self) -> String {
        // Unit separator keeps ("ab", None) distinct from ("a", Some("b")).
        let digest = sha256_hex(&format!(
            "{}\u{1f}{}",
            self.prompt,
            self.context.as_deref().unwrap_or("")
        ));
        format!("ai:{}", digest)
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}
