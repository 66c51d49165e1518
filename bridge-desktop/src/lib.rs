//! # Desktop Bridge Adapters
//!
//! Desktop implementations of the `bridge-traits` host abstractions:
//!
//! - [`ReqwestHttpClient`]: pooled HTTPS transport for the liveness probe
//!   and the generation backends
//! - [`JsonFileStore`]: flat JSON file standing in for `localStorage`
//! - [`TcpProbeConnectivitySource`]: polled TCP connect synthesizing
//!   online/offline edges

pub mod connectivity;
pub mod http;
pub mod store;

pub use connectivity::TcpProbeConnectivitySource;
pub use http::ReqwestHttpClient;
pub use store::JsonFileStore;
