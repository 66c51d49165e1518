//! Payload size accounting
//!
//! The byte budget needs an approximate size for every stored value. Binary
//! payloads report their exact length; structured values fall back to a
//! JSON-serialization estimate.

use bytes::Bytes;
use serde::Serialize;

/// Approximate in-memory size of a cached payload.
pub trait CacheWeight {
    /// Size in bytes used for budget accounting.
    fn weight_bytes(&self) -> usize;
}

impl CacheWeight for Bytes {
    fn weight_bytes(&self) -> usize {
        self.len()
    }
}

impl CacheWeight for Vec<u8> {
    fn weight_bytes(&self) -> usize {
        self.len()
    }
}

impl CacheWeight for String {
    fn weight_bytes(&self) -> usize {
        self.len()
    }
}

/// JSON-serialization-based size estimate for structured values.
///
/// Unserializable values weigh 0 rather than failing: weighing is
/// bookkeeping, not validation.
pub fn json_weight<T: Serialize>(value: &T) -> usize {
    serde_json::to_vec(value).map(|v| v.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_weight_is_exact() {
        let payload = Bytes::from(vec![0u8; 1024]);
        assert_eq!(payload.weight_bytes(), 1024);

        let text = "abcd".to_string();
        assert_eq!(text.weight_bytes(), 4);
    }

    #[test]
    fn test_json_weight_estimates_structured_values() {
        #[derive(Serialize)]
        struct Page {
            text: String,
            number: u32,
        }

        let page = Page {
            text: "hello".to_string(),
            number: 3,
        };

        let weight = json_weight(&page);
        assert!(weight >= "hello".len());
    }
}
