//! # Cache Error Types

use thiserror::Error;

/// Errors that can occur during cache construction and persistence.
///
/// Routine cache outcomes (miss, oversized rejection, expired entry) are
/// deliberately NOT errors: they are normal results of cache operation and
/// surface as `None` / no-ops.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache configuration is invalid.
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// Persisted snapshot could not be written or removed.
    #[error("Snapshot persistence failed: {0}")]
    Persistence(String),

    /// Persisted snapshot could not be parsed.
    #[error("Snapshot corrupted: {0}")]
    CorruptSnapshot(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
