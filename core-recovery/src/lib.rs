//! # Failure Classification and Recovery
//!
//! Turns raw transport and backend failures into a typed taxonomy
//! ([`ErrorContext`]) and retries the retryable ones with exponential
//! backoff. Attempt budgets are keyed by failure identity, so repeated
//! failures of one operation never starve another. A one-shot fallback hook
//! can substitute a degraded result (a cached page, a silent audio segment)
//! when the budget runs out.

pub mod classify;
pub mod context;
pub mod policy;

pub use classify::{classify, classify_with, ClassifyOptions};
pub use context::{ErrorContext, ErrorKind, RawFailure, Severity};
pub use policy::{RecoveryConfig, RecoveryPolicy, RetryBudgetKey};
