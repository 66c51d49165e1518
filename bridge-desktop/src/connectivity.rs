//! Connectivity Edge Detection
//!
//! Desktop hosts have no `online`/`offline` browser events, so connectivity
//! edges are synthesized by polling a TCP connect against a well-known
//! endpoint and emitting a signal only when the answer changes.
//!
//! Platform-specific watchers (Linux netlink, macOS SystemConfiguration,
//! Windows WinAPI) would be more precise but require extra dependencies.

use async_trait::async_trait;
use bridge_traits::connectivity::{ConnectivitySignal, ConnectivityStream};
use std::time::Duration;
use tracing::debug;

/// Polling TCP-connect connectivity source.
pub struct TcpProbeConnectivitySource {
    endpoint: String,
    interval: Duration,
    connect_timeout: Duration,
    last: Option<ConnectivitySignal>,
}

impl TcpProbeConnectivitySource {
    /// Probe a public DNS resolver every five seconds.
    pub fn new() -> Self {
        Self::with_endpoint("8.8.8.8:53", Duration::from_secs(5))
    }

    pub fn with_endpoint(endpoint: impl Into<String>, interval: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            interval,
            connect_timeout: Duration::from_secs(5),
            last: None,
        }
    }

    async fn probe(&self) -> ConnectivitySignal {
        let attempt = tokio::time::timeout(
            self.connect_timeout,
            tokio::net::TcpStream::connect(&self.endpoint),
        )
        .await;

        match attempt {
            Ok(Ok(_)) => ConnectivitySignal::Online,
            _ => ConnectivitySignal::Offline,
        }
    }
}

impl Default for TcpProbeConnectivitySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectivityStream for TcpProbeConnectivitySource {
    /// Blocks until connectivity changes, then yields the new signal.
    /// The first call yields the initial observation immediately.
    async fn next(&mut self) -> Option<ConnectivitySignal> {
        loop {
            let signal = self.probe().await;
            if self.last != Some(signal) {
                self.last = Some(signal);
                debug!(?signal, "Connectivity edge detected");
                return Some(signal);
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_endpoint_reads_offline() {
        // TEST-NET-1 address, guaranteed unroutable.
        let mut source =
            TcpProbeConnectivitySource::with_endpoint("192.0.2.1:9", Duration::from_millis(10));
        source.connect_timeout = Duration::from_millis(200);

        assert_eq!(source.next().await, Some(ConnectivitySignal::Offline));
    }
}
