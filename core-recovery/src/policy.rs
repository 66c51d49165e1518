//! Retry orchestration with exponential backoff
//!
//! [`RecoveryPolicy`] wraps a fallible async operation, classifies each
//! failure, and retries retryable ones with exponentially growing delays.
//! Attempt counts are tracked per [`RetryBudgetKey`] so one failing endpoint
//! cannot drain the budget of an unrelated one.

use crate::classify::{classify_with, ClassifyOptions};
use crate::context::{ErrorContext, ErrorKind, RawFailure};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Identity of a failure for budget accounting: kind plus a normalized
/// message, so "Timeout  fetching page 3" and "timeout fetching page 3"
/// share one budget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RetryBudgetKey {
    pub kind: ErrorKind,
    pub normalized_message: String,
}

impl RetryBudgetKey {
    pub fn from_context(ctx: &ErrorContext) -> Self {
        Self {
            kind: ctx.kind,
            normalized_message: normalize(&ctx.message),
        }
    }
}

fn normalize(message: &str) -> String {
    message
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Backoff and budget tuning.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Retries per budget key, beyond the initial attempt.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
    pub classify: ClassifyOptions,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
            classify: ClassifyOptions::default(),
        }
    }
}

impl RecoveryConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }
}

/// Retry executor with per-failure-identity attempt budgets.
pub struct RecoveryPolicy {
    config: RecoveryConfig,
    attempts: Mutex<HashMap<RetryBudgetKey, u32>>,
}

impl RecoveryPolicy {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            config,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Delay before retry number `attempt` (zero-based): base * 2^attempt,
    /// capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.min(16);
        let exponential = self.config.base_delay.saturating_mul(1u32 << shift);
        exponential.min(self.config.max_delay)
    }

    /// Attempts consumed so far for a budget key.
    pub fn attempts_for(&self, key: &RetryBudgetKey) -> u32 {
        self.attempts.lock().get(key).copied().unwrap_or(0)
    }

    /// Forget all recorded attempt counts.
    pub fn reset(&self) {
        self.attempts.lock().clear();
    }

    /// Run `operation` until it succeeds, its failure is classified as
    /// non-retryable, or the budget for its failure identity is exhausted.
    ///
    /// On success, budgets for every failure identity seen during this call
    /// are cleared.
    pub async fn run_with_recovery<T, F, Fut>(&self, operation: F) -> Result<T, ErrorContext>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RawFailure>>,
    {
        let mut keys_seen: Vec<RetryBudgetKey> = Vec::new();

        loop {
            match operation().await {
                Ok(value) => {
                    if !keys_seen.is_empty() {
                        let mut attempts = self.attempts.lock();
                        for key in &keys_seen {
                            attempts.remove(key);
                        }
                    }
                    return Ok(value);
                }
                Err(failure) => {
                    let ctx = classify_with(&failure, &self.config.classify);
                    let key = RetryBudgetKey::from_context(&ctx);

                    if !ctx.retryable {
                        info!(kind = ?ctx.kind, message = %ctx.message, "failure is not retryable");
                        return Err(ctx);
                    }

                    let attempt = {
                        let mut attempts = self.attempts.lock();
                        let counter = attempts.entry(key.clone()).or_insert(0);
                        let current = *counter;
                        *counter += 1;
                        current
                    };

                    if attempt >= self.config.max_attempts {
                        warn!(
                            kind = ?ctx.kind,
                            retries = attempt,
                            message = %ctx.message,
                            "retry budget exhausted"
                        );
                        return Err(ctx);
                    }

                    if !keys_seen.contains(&key) {
                        keys_seen.push(key);
                    }

                    let delay = self.backoff_delay(attempt);
                    debug!(
                        kind = ?ctx.kind,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Like [`run_with_recovery`](Self::run_with_recovery), but before
    /// surfacing a terminal failure the `fallback` is consulted exactly once.
    /// A `Some` substitute value turns the failure into success.
    pub async fn run_with_fallback<T, F, Fut, FB, FbFut>(
        &self,
        operation: F,
        fallback: FB,
    ) -> Result<T, ErrorContext>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, RawFailure>>,
        FB: FnOnce(&ErrorContext) -> FbFut,
        FbFut: Future<Output = Option<T>>,
    {
        match self.run_with_recovery(operation).await {
            Ok(value) => Ok(value),
            Err(ctx) => {
                info!(kind = ?ctx.kind, "consulting fallback after terminal failure");
                match fallback(&ctx).await {
                    Some(substitute) => Ok(substitute),
                    None => Err(ctx),
                }
            }
        }
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self::new(RecoveryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RecoveryPolicy::default();

        assert_eq!(policy.backoff_delay(0), Duration::from_millis(1_000));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(2_000));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(4_000));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(8_000));
        assert_eq!(policy.backoff_delay(4), Duration::from_millis(10_000));
        assert_eq!(policy.backoff_delay(30), Duration::from_millis(10_000));
    }

    #[test]
    fn test_budget_key_normalization() {
        let a = RetryBudgetKey {
            kind: ErrorKind::Network,
            normalized_message: normalize("Timeout   fetching\tpage 3"),
        };
        let b = RetryBudgetKey {
            kind: ErrorKind::Network,
            normalized_message: normalize("timeout fetching page 3"),
        };
        assert_eq!(a, b);
    }
}
