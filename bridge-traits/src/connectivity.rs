//! Connectivity Signal Abstraction
//!
//! Surfaces platform-level "became online" / "became offline" edges to the
//! core. The health monitor reacts to these immediately, without waiting for
//! the next scheduled probe.

use async_trait::async_trait;

/// A platform-level connectivity edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivitySignal {
    /// The platform reports a network interface became available.
    Online,
    /// The platform reports all connectivity was lost.
    Offline,
}

/// Stream of connectivity edges.
///
/// Implementations should emit a signal only when the platform state
/// actually changes, not on every poll.
///
/// # Platform Support
///
/// - **Desktop**: interface polling or OS notification APIs
/// - **Web**: `online` / `offline` window events
#[async_trait]
pub trait ConnectivityStream: Send {
    /// Get the next connectivity edge.
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<ConnectivitySignal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedStream {
        signals: Vec<ConnectivitySignal>,
    }

    #[async_trait]
    impl ConnectivityStream for ScriptedStream {
        async fn next(&mut self) -> Option<ConnectivitySignal> {
            if self.signals.is_empty() {
                None
            } else {
                Some(self.signals.remove(0))
            }
        }
    }

    #[tokio::test]
    async fn test_scripted_stream_drains_in_order() {
        let mut stream = ScriptedStream {
            signals: vec![ConnectivitySignal::Offline, ConnectivitySignal::Online],
        };

        assert_eq!(stream.next().await, Some(ConnectivitySignal::Offline));
        assert_eq!(stream.next().await, Some(ConnectivitySignal::Online));
        assert_eq!(stream.next().await, None);
    }
}
