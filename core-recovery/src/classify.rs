//! Failure classification
//!
//! A pure mapping from raw failures (HTTP status + body, transport
//! exceptions, domain messages) to [`ErrorContext`]. Status rules win over
//! message markers; markers win over the unknown fallback.

use crate::context::{ErrorContext, ErrorKind, RawFailure, Severity};

/// Caller context that influences classification.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Whether a secondary extraction path exists; controls whether
    /// `PdfProcessing` failures are worth retrying.
    pub pdf_fallback_available: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            pdf_fallback_available: true,
        }
    }
}

/// Classify with default options.
pub fn classify(failure: &RawFailure) -> ErrorContext {
    classify_with(failure, &ClassifyOptions::default())
}

/// Classify a raw failure into a typed, retry-gated context.
pub fn classify_with(failure: &RawFailure, options: &ClassifyOptions) -> ErrorContext {
    match failure {
        RawFailure::Http { status, body } => classify_http(*status, body, options),
        RawFailure::Timeout => ErrorContext::new(
            ErrorKind::Network,
            Severity::Error,
            "Request timed out",
            true,
        )
        .with_suggestion("Check your connection and try again"),
        RawFailure::ConnectionRefused => ErrorContext::new(
            ErrorKind::Network,
            Severity::Error,
            "Could not reach the server",
            true,
        )
        .with_suggestion("Check your connection and try again"),
        RawFailure::Message(message) => classify_message(message, options),
    }
}

fn classify_http(status: u16, body: &str, options: &ClassifyOptions) -> ErrorContext {
    match status {
        500.. => ErrorContext::new(
            ErrorKind::BackendUnavailable,
            Severity::Error,
            format!("Server error ({}): {}", status, truncate(body)),
            true,
        )
        .with_suggestion("The service is temporarily unavailable; try again shortly"),
        413 => ErrorContext::new(
            ErrorKind::FileTooLarge,
            Severity::Warning,
            "File too large",
            false,
        )
        .with_suggestion("Maximum upload size is 50MB; try a smaller file"),
        404 => ErrorContext::new(
            ErrorKind::Unknown,
            Severity::Warning,
            format!("Not found: {}", truncate(body)),
            false,
        ),
        400 => ErrorContext::new(
            ErrorKind::Validation,
            Severity::Warning,
            format!("Invalid request: {}", truncate(body)),
            false,
        )
        .with_suggestion("Check the input and try again"),
        _ => classify_message(body, options),
    }
}

fn classify_message(message: &str, options: &ClassifyOptions) -> ErrorContext {
    let lowered = message.to_lowercase();

    if contains_any(&lowered, &["tts", "speech", "voice", "audio"]) {
        // A cached or alternate voice can usually cover a transient
        // synthesis failure.
        return ErrorContext::new(ErrorKind::Tts, Severity::Error, message, true)
            .with_suggestion("Audio generation failed; retrying with the current voice");
    }

    if contains_any(&lowered, &["pdf", "document", "extract", "page"]) {
        return ErrorContext::new(
            ErrorKind::PdfProcessing,
            Severity::Error,
            message,
            options.pdf_fallback_available,
        )
        .with_suggestion("The document could not be processed; a fallback extraction will be tried");
    }

    if contains_any(&lowered, &["unsupported", "format"]) {
        return ErrorContext::new(ErrorKind::UnsupportedFormat, Severity::Warning, message, false)
            .with_suggestion("This file format is not supported; try PDF, EPUB, or plain text");
    }

    ErrorContext::new(ErrorKind::Unknown, Severity::Error, message, false)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn truncate(body: &str) -> &str {
    let limit = 200.min(body.len());
    // Stay on a char boundary for multi-byte bodies.
    let mut end = limit;
    while end > 0 && !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_500_is_retryable_backend_failure() {
        let ctx = classify(&RawFailure::Http {
            status: 500,
            body: "internal error".to_string(),
        });

        assert_eq!(ctx.kind, ErrorKind::BackendUnavailable);
        assert_eq!(ctx.severity, Severity::Error);
        assert!(ctx.retryable);
    }

    #[test]
    fn test_http_413_is_terminal() {
        let ctx = classify(&RawFailure::Http {
            status: 413,
            body: String::new(),
        });

        assert_eq!(ctx.kind, ErrorKind::FileTooLarge);
        assert!(!ctx.retryable);
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_http_400_and_404() {
        let validation = classify(&RawFailure::Http {
            status: 400,
            body: "Invalid YouTube URL".to_string(),
        });
        assert_eq!(validation.kind, ErrorKind::Validation);
        assert!(!validation.retryable);

        let missing = classify(&RawFailure::Http {
            status: 404,
            body: "Audio file not found".to_string(),
        });
        assert_eq!(missing.kind, ErrorKind::Unknown);
        assert_eq!(missing.severity, Severity::Warning);
        assert!(!missing.retryable);
    }

    #[test]
    fn test_transport_failures_are_network() {
        assert_eq!(classify(&RawFailure::Timeout).kind, ErrorKind::Network);
        let refused = classify(&RawFailure::ConnectionRefused);
        assert_eq!(refused.kind, ErrorKind::Network);
        assert!(refused.retryable);
    }

    #[test]
    fn test_domain_markers() {
        let tts = classify(&RawFailure::message("Error generating audio for page"));
        assert_eq!(tts.kind, ErrorKind::Tts);
        assert!(tts.retryable);

        let pdf = classify(&RawFailure::message("failed to extract text from PDF"));
        assert_eq!(pdf.kind, ErrorKind::PdfProcessing);
        assert!(pdf.retryable); // fallback path available by default

        let no_fallback = classify_with(
            &RawFailure::message("failed to extract text from PDF"),
            &ClassifyOptions {
                pdf_fallback_available: false,
            },
        );
        assert!(!no_fallback.retryable);
    }

    #[test]
    fn test_unknown_fallback_is_terminal() {
        let ctx = classify(&RawFailure::message("something odd happened"));
        assert_eq!(ctx.kind, ErrorKind::Unknown);
        assert!(!ctx.retryable);
    }
}
