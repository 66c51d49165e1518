//! Connection status and quality types

use serde::{Deserialize, Serialize};

/// Classified connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Probes succeed with acceptable latency.
    Online,
    /// The platform reported connectivity loss, or probes failed repeatedly.
    Offline,
    /// Probes succeed slowly, or intermittent failures below the offline
    /// threshold.
    Slow,
    /// The platform reported connectivity restored; awaiting the confirming
    /// probe.
    Reconnecting,
}

impl ConnectionStatus {
    /// True for any state in which issuing requests is plausible.
    pub fn is_usable(&self) -> bool {
        !matches!(self, ConnectionStatus::Offline)
    }
}

/// Point-in-time view of link health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkQuality {
    pub status: ConnectionStatus,
    /// Arithmetic mean over the rolling latency window, milliseconds.
    pub latency_millis: u64,
    /// Coarse estimate from probe payload size over round-trip time.
    pub bandwidth_estimate_mbps: f64,
    /// When the last probe settled, Unix milliseconds.
    pub last_checked_at: i64,
    /// True only with zero consecutive failures and rolling latency under
    /// the reliability threshold.
    pub is_reliable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_states() {
        assert!(ConnectionStatus::Online.is_usable());
        assert!(ConnectionStatus::Slow.is_usable());
        assert!(ConnectionStatus::Reconnecting.is_usable());
        assert!(!ConnectionStatus::Offline.is_usable());
    }
}
