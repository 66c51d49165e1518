//! # Network Health Monitoring
//!
//! Connection-state classification for the reader core. A periodic liveness
//! probe and platform connectivity edges feed a four-state machine
//! (`Online`/`Offline`/`Slow`/`Reconnecting`); the cache and pre-fetch
//! layers consult its predicates to decide whether to attempt, retry, or
//! defer network work.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_network::{MonitorConfig, NetworkHealthMonitor};
//! use tokio_util::sync::CancellationToken;
//! use std::sync::Arc;
//!
//! # async fn example(http: Arc<dyn bridge_traits::HttpClient>, clock: Arc<dyn bridge_traits::Clock>) {
//! let monitor = Arc::new(
//!     NetworkHealthMonitor::new(http, clock, MonitorConfig::new("http://localhost:8000/api/health"))
//!         .expect("valid config"),
//! );
//!
//! monitor.on_status_change(|status| tracing::info!(?status, "connection changed"));
//!
//! let cancel = CancellationToken::new();
//! let loop_handle = {
//!     let monitor = monitor.clone();
//!     let cancel = cancel.clone();
//!     tokio::spawn(async move { monitor.run(cancel).await })
//! };
//! # }
//! ```

pub mod config;
pub mod monitor;
pub mod types;

pub use config::MonitorConfig;
pub use monitor::NetworkHealthMonitor;
pub use types::{ConnectionStatus, NetworkQuality};
