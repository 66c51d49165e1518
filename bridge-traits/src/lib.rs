//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the reader core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be implemented differently per platform
//! (desktop, mobile, web).
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP transport for the liveness
//!   probe and generation backends
//! - [`ConnectivityStream`](connectivity::ConnectivityStream) - Platform
//!   online/offline edges
//!
//! ### Storage
//! - [`LocalStore`](store::LocalStore) - Flat string key-value persistence for
//!   cache snapshots
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing rather than degrading silently.
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for
//! consistent error handling. Platform implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Preserve the timeout / connection-refused distinction, which the error
//!   classifier downstream depends on
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks.
//!
//! ## Mocks
//!
//! Enabling the `mocks` feature generates `mockall` doubles (`MockHttpClient`,
//! `MockLocalStore`) for consumer test suites.

pub mod connectivity;
pub mod error;
pub mod http;
pub mod store;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use connectivity::{ConnectivitySignal, ConnectivityStream};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use store::{LocalStore, MemoryLocalStore};
pub use time::{Clock, ManualClock, SystemClock};

#[cfg(feature = "mocks")]
pub use http::MockHttpClient;
#[cfg(feature = "mocks")]
pub use store::MockLocalStore;
