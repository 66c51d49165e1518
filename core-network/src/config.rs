//! Health monitor configuration

use std::time::Duration;

/// Configuration for the network health monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Liveness endpoint; any non-2xx or timeout counts as probe failure.
    pub health_url: String,

    /// Upper bound on one probe round trip (default: 5s)
    pub probe_timeout: Duration,

    /// Probe interval while `Online` (default: 30s)
    pub online_interval: Duration,

    /// Probe interval in every other state (default: 5s)
    pub degraded_interval: Duration,

    /// Successful probes slower than this classify as `Slow` (default: 2000ms)
    pub slow_latency_threshold: Duration,

    /// Consecutive failures at or above this classify as `Offline` (default: 3)
    pub offline_failure_threshold: u32,

    /// Rolling latency above this disqualifies `is_reliable` (default: 500ms)
    pub reliable_latency_threshold: Duration,

    /// Number of samples in the rolling latency window (default: 10)
    pub latency_window: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            health_url: "http://127.0.0.1:8000/api/health".to_string(),
            probe_timeout: Duration::from_secs(5),
            online_interval: Duration::from_secs(30),
            degraded_interval: Duration::from_secs(5),
            slow_latency_threshold: Duration::from_millis(2000),
            offline_failure_threshold: 3,
            reliable_latency_threshold: Duration::from_millis(500),
            latency_window: 10,
        }
    }
}

impl MonitorConfig {
    pub fn new(health_url: impl Into<String>) -> Self {
        Self {
            health_url: health_url.into(),
            ..Default::default()
        }
    }

    /// Set the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set both probe intervals.
    pub fn with_intervals(mut self, online: Duration, degraded: Duration) -> Self {
        self.online_interval = online;
        self.degraded_interval = degraded;
        self
    }

    /// Set the offline failure threshold.
    pub fn with_offline_threshold(mut self, failures: u32) -> Self {
        self.offline_failure_threshold = failures;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.health_url.is_empty() {
            return Err("health_url cannot be empty".to_string());
        }

        if self.offline_failure_threshold == 0 {
            return Err("offline_failure_threshold must be at least 1".to_string());
        }

        if self.latency_window == 0 {
            return Err("latency_window must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.offline_failure_threshold, 3);
        assert_eq!(config.latency_window, 10);
    }

    #[test]
    fn test_config_validation() {
        assert!(MonitorConfig::new("").validate().is_err());
        assert!(MonitorConfig::default()
            .with_offline_threshold(0)
            .validate()
            .is_err());
    }
}
