//! # Network Health Monitor
//!
//! Classifies connection state from periodic liveness probes and
//! platform connectivity edges, and exposes the wait/retry predicates the
//! cache and pre-fetch layers gate on.
//!
//! ## State machine
//!
//! ```text
//!              platform offline edge
//!   (any) ─────────────────────────────> Offline
//!              platform online edge
//!   (any) ─────────────────────────────> Reconnecting ──probe──> Online/Slow/Offline
//!
//!   probe ok, rtt <= slow threshold  -> Online   (failure counter reset)
//!   probe ok, rtt >  slow threshold  -> Slow
//!   probe failed, failures <  limit  -> Slow
//!   probe failed, failures >= limit  -> Offline
//! ```
//!
//! Startup state is `Online` (optimistic); the first probe corrects it.
//!
//! The monitor is a pure async component: the host runs [`NetworkHealthMonitor::run`]
//! under a `CancellationToken` in whatever execution context fits.

use crate::config::MonitorConfig;
use crate::types::{ConnectionStatus, NetworkQuality};
use bridge_traits::connectivity::{ConnectivitySignal, ConnectivityStream};
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::time::Clock;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type StatusCallback = Box<dyn Fn(ConnectionStatus) + Send + Sync>;

struct MonitorState {
    status: ConnectionStatus,
    consecutive_failures: u32,
    latency_window: VecDeque<u64>,
    bandwidth_estimate_mbps: f64,
    last_checked_at: i64,
}

/// Health-probe driven connection state machine.
pub struct NetworkHealthMonitor {
    http_client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    config: MonitorConfig,
    state: Mutex<MonitorState>,
    subscribers: Mutex<Vec<StatusCallback>>,
    online_notify: Notify,
}

impl NetworkHealthMonitor {
    /// Create a monitor. Starts `Online` until the first probe says
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns the validation message if the configuration is invalid.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        clock: Arc<dyn Clock>,
        config: MonitorConfig,
    ) -> Result<Self, String> {
        config.validate()?;

        Ok(Self {
            http_client,
            clock,
            config,
            state: Mutex::new(MonitorState {
                status: ConnectionStatus::Online,
                consecutive_failures: 0,
                latency_window: VecDeque::new(),
                bandwidth_estimate_mbps: 0.0,
                last_checked_at: 0,
            }),
            subscribers: Mutex::new(Vec::new()),
            online_notify: Notify::new(),
        })
    }

    /// Current classified status.
    pub fn status(&self) -> ConnectionStatus {
        self.state.lock().status
    }

    /// Current quality snapshot.
    pub fn quality(&self) -> NetworkQuality {
        let state = self.state.lock();
        let latency = rolling_mean(&state.latency_window);

        NetworkQuality {
            status: state.status,
            latency_millis: latency,
            bandwidth_estimate_mbps: state.bandwidth_estimate_mbps,
            last_checked_at: state.last_checked_at,
            is_reliable: state.consecutive_failures == 0
                && latency < self.config.reliable_latency_threshold.as_millis() as u64,
        }
    }

    /// Register a callback invoked synchronously on every state transition
    /// (not on every probe).
    pub fn on_status_change<F>(&self, callback: F)
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        self.subscribers.lock().push(Box::new(callback));
    }

    /// True when the caller should stop attempting network work and serve
    /// from cache instead.
    pub fn should_use_offline_mode(&self) -> bool {
        let state = self.state.lock();
        match state.status {
            ConnectionStatus::Offline => true,
            ConnectionStatus::Slow => state.consecutive_failures > 1,
            _ => false,
        }
    }

    /// True when a failed request is worth retrying at all.
    pub fn should_retry(&self) -> bool {
        let state = self.state.lock();
        state.status != ConnectionStatus::Offline
            && state.consecutive_failures < self.config.offline_failure_threshold
    }

    /// Suspend until the status becomes `Online` or the timeout elapses.
    /// Returns whether the connection came back in time.
    pub async fn wait_for_connection(&self, timeout: std::time::Duration) -> bool {
        if self.status() == ConnectionStatus::Online {
            return true;
        }

        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.online_notify.notified();
                if self.status() == ConnectionStatus::Online {
                    return;
                }
                notified.await;
                if self.status() == ConnectionStatus::Online {
                    return;
                }
            }
        })
        .await
        .is_ok()
    }

    /// Issue one liveness probe and apply the resulting transition.
    /// Returns the status after the probe.
    pub async fn probe_once(&self) -> ConnectionStatus {
        let request = HttpRequest::get(&self.config.health_url).timeout(self.config.probe_timeout);

        let started_at = self.clock.unix_timestamp_millis();
        let result = tokio::time::timeout(
            self.config.probe_timeout,
            self.http_client.execute(request),
        )
        .await;
        let settled_at = self.clock.unix_timestamp_millis();
        let latency_millis = settled_at.saturating_sub(started_at).max(0) as u64;

        match result {
            Ok(Ok(response)) if response.is_success() => {
                self.record_success(latency_millis, response.body.len(), settled_at)
            }
            Ok(Ok(response)) => {
                debug!(status = response.status, "liveness probe returned non-success");
                self.record_failure(settled_at)
            }
            Ok(Err(e)) => {
                debug!(error = %e, "liveness probe transport failure");
                self.record_failure(settled_at)
            }
            Err(_) => {
                debug!(
                    timeout_ms = self.config.probe_timeout.as_millis() as u64,
                    "liveness probe timed out"
                );
                self.record_failure(settled_at)
            }
        }
    }

    /// Probe loop. Interval is 30s while `Online`, 5s otherwise (per
    /// config). Runs until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(health_url = %self.config.health_url, "network health monitor started");

        loop {
            let status = self.probe_once().await;

            let interval = if status == ConnectionStatus::Online {
                self.config.online_interval
            } else {
                self.config.degraded_interval
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("network health monitor stopped");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }

    /// Apply a platform connectivity edge.
    ///
    /// Offline edges take effect immediately; online edges enter
    /// `Reconnecting` and trigger a confirming probe.
    pub async fn notify_connectivity(&self, signal: ConnectivitySignal) {
        match signal {
            ConnectivitySignal::Offline => {
                warn!("platform reported connectivity lost");
                self.transition(ConnectionStatus::Offline);
            }
            ConnectivitySignal::Online => {
                info!("platform reported connectivity restored, reprobing");
                self.transition(ConnectionStatus::Reconnecting);
                self.probe_once().await;
            }
        }
    }

    /// Consume a platform connectivity stream until it closes or the token
    /// is cancelled.
    pub async fn watch_signals(
        &self,
        mut signals: Box<dyn ConnectivityStream>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                signal = signals.next() => {
                    match signal {
                        Some(signal) => self.notify_connectivity(signal).await,
                        None => return,
                    }
                }
            }
        }
    }

    fn record_success(
        &self,
        latency_millis: u64,
        body_len: usize,
        checked_at: i64,
    ) -> ConnectionStatus {
        let next = {
            let mut state = self.state.lock();

            state.latency_window.push_back(latency_millis);
            while state.latency_window.len() > self.config.latency_window {
                state.latency_window.pop_front();
            }

            // Bandwidth from payload size over RTT; floor the RTT so a
            // same-millisecond probe doesn't divide by zero.
            let rtt_secs = (latency_millis.max(1)) as f64 / 1000.0;
            state.bandwidth_estimate_mbps = (body_len as f64 * 8.0) / rtt_secs / 1_000_000.0;
            state.last_checked_at = checked_at;

            if latency_millis <= self.config.slow_latency_threshold.as_millis() as u64 {
                state.consecutive_failures = 0;
                ConnectionStatus::Online
            } else {
                ConnectionStatus::Slow
            }
        };

        self.transition(next);
        next
    }

    fn record_failure(&self, checked_at: i64) -> ConnectionStatus {
        let next = {
            let mut state = self.state.lock();
            state.consecutive_failures += 1;
            state.last_checked_at = checked_at;

            if state.consecutive_failures >= self.config.offline_failure_threshold {
                ConnectionStatus::Offline
            } else {
                ConnectionStatus::Slow
            }
        };

        self.transition(next);
        next
    }

    fn transition(&self, next: ConnectionStatus) {
        let changed = {
            let mut state = self.state.lock();
            if state.status == next {
                false
            } else {
                debug!(from = ?state.status, to = ?next, "connection status transition");
                state.status = next;
                true
            }
        };

        if !changed {
            return;
        }

        if next == ConnectionStatus::Online {
            self.online_notify.notify_waiters();
        }

        let subscribers = self.subscribers.lock();
        for callback in subscribers.iter() {
            callback(next);
        }
    }
}

fn rolling_mean(window: &VecDeque<u64>) -> u64 {
    if window.is_empty() {
        return 0;
    }

    let sum: u64 = window.iter().sum();
    sum / window.len() as u64
}
