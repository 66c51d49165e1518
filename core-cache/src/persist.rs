//! Snapshot persistence
//!
//! When `persist_to_store` is enabled and a [`LocalStore`] is attached, the
//! engine rewrites a flat JSON snapshot under the config namespace on every
//! mutating operation and rehydrates from it on startup.
//!
//! Encoding is pluggable per value type. Binary payloads are represented in
//! the snapshot as a placeholder (`value: None`) and are dropped on
//! rehydration: the audio cache is memory-only by decision, since speech
//! segments are cheap to regenerate relative to the cost of ballooning the
//! host's string store with base64 blobs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Pluggable snapshot encoding for one value type.
///
/// `encode` returning `None` marks the value non-persistable; the entry is
/// written as a placeholder and skipped on rehydration.
pub trait ValueCodec<V>: Send + Sync {
    fn encode(&self, value: &V) -> Option<String>;
    fn decode(&self, raw: &str) -> Option<V>;
}

/// JSON codec for structured values.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueCodec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn encode(&self, value: &T) -> Option<String> {
        serde_json::to_string(value).ok()
    }

    fn decode(&self, raw: &str) -> Option<T> {
        serde_json::from_str(raw).ok()
    }
}

/// Identity codec for plain string payloads.
pub struct StringCodec;

impl ValueCodec<String> for StringCodec {
    fn encode(&self, value: &String) -> Option<String> {
        Some(value.clone())
    }

    fn decode(&self, raw: &str) -> Option<String> {
        Some(raw.to_string())
    }
}

/// Placeholder codec for binary payloads.
///
/// Never encodes and never decodes, so binary caches survive in memory only.
pub struct OpaqueBinaryCodec;

impl<V: Send + Sync> ValueCodec<V> for OpaqueBinaryCodec {
    fn encode(&self, _value: &V) -> Option<String> {
        None
    }

    fn decode(&self, _raw: &str) -> Option<V> {
        None
    }
}

/// One persisted entry. `value: None` is the binary placeholder.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SnapshotEntry {
    pub key: String,
    pub value: Option<String>,
    pub created_at: i64,
    pub expires_at: i64,
    pub hit_count: u64,
}

/// Flat snapshot of one cache instance.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub entries: Vec<SnapshotEntry>,
    pub total_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_codec_roundtrip() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Page {
            text: String,
        }

        let codec = JsonCodec::<Page>::new();
        let page = Page {
            text: "hello".to_string(),
        };

        let raw = codec.encode(&page).unwrap();
        assert_eq!(codec.decode(&raw), Some(page));
    }

    #[test]
    fn test_opaque_codec_declines() {
        let codec = OpaqueBinaryCodec;
        let payload = bytes::Bytes::from("audio");

        assert!(ValueCodec::<bytes::Bytes>::encode(&codec, &payload).is_none());
        assert!(ValueCodec::<bytes::Bytes>::decode(&codec, "anything").is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = Snapshot {
            entries: vec![SnapshotEntry {
                key: "k".to_string(),
                value: Some("v".to_string()),
                created_at: 1,
                expires_at: 2,
                hit_count: 0,
            }],
            total_bytes: 1,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.total_bytes, 1);
    }
}
