//! Error taxonomy and classified error context

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for everything the reading flow can hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport-level failure: timeout, refused connection, DNS.
    Network,
    /// The conversion/TTS backend answered but is unhealthy (5xx).
    BackendUnavailable,
    /// The request itself was malformed or rejected (4xx).
    Validation,
    /// Document text extraction failed.
    PdfProcessing,
    /// Speech synthesis failed.
    Tts,
    /// Upload exceeded the backend's size cap.
    FileTooLarge,
    /// Document format the pipeline cannot process.
    UnsupportedFormat,
    /// Anything unclassifiable.
    Unknown,
}

/// How loud the failure should be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

/// A classified failure, ready for retry gating or user display.
///
/// Invariant: `retryable == false` means no backoff retry is attempted,
/// regardless of remaining attempt budget.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ErrorContext {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub message: String,
    pub retryable: bool,
    /// User-facing guidance for non-retryable or exhausted failures.
    pub suggestion: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl ErrorContext {
    pub fn new(
        kind: ErrorKind,
        severity: Severity,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            retryable,
            suggestion: None,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// A raw failure as delivered by a transport or collaborator, before
/// classification.
#[derive(Debug, Clone)]
pub enum RawFailure {
    /// HTTP response with a non-success status.
    Http { status: u16, body: String },
    /// Transport-level timeout.
    Timeout,
    /// Transport-level connection refusal.
    ConnectionRefused,
    /// Domain exception carried as a message.
    Message(String),
}

impl RawFailure {
    pub fn message(text: impl Into<String>) -> Self {
        RawFailure::Message(text.into())
    }
}

impl From<bridge_traits::BridgeError> for RawFailure {
    fn from(err: bridge_traits::BridgeError) -> Self {
        match err {
            bridge_traits::BridgeError::Timeout(_) => RawFailure::Timeout,
            bridge_traits::BridgeError::ConnectionRefused(_) => RawFailure::ConnectionRefused,
            other => RawFailure::Message(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_context_builder() {
        let ctx = ErrorContext::new(ErrorKind::Tts, Severity::Error, "synthesis failed", true)
            .with_suggestion("Try a different voice");

        assert_eq!(ctx.kind, ErrorKind::Tts);
        assert!(ctx.retryable);
        assert_eq!(ctx.suggestion.as_deref(), Some("Try a different voice"));
        assert!(ctx.created_at > 0);
    }

    #[test]
    fn test_bridge_error_mapping() {
        let timeout: RawFailure = bridge_traits::BridgeError::Timeout(5_000).into();
        assert!(matches!(timeout, RawFailure::Timeout));

        let refused: RawFailure =
            bridge_traits::BridgeError::ConnectionRefused("x".to_string()).into();
        assert!(matches!(refused, RawFailure::ConnectionRefused));
    }
}
