//! Tests for the network health monitor state machine

use async_trait::async_trait;
use bridge_traits::connectivity::ConnectivitySignal;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::time::ManualClock;
use bridge_traits::MockHttpClient;
use bytes::Bytes;
use core_network::{ConnectionStatus, MonitorConfig, NetworkHealthMonitor};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Copy)]
enum Probe {
    Ok { latency_ms: i64, status: u16 },
    TransportError,
}

/// Scripted probe transport. Each execute consumes one script step and
/// advances the shared manual clock by the scripted latency, so the monitor
/// measures exactly that round trip.
struct ScriptedProbe {
    clock: ManualClock,
    script: Mutex<VecDeque<Probe>>,
}

impl ScriptedProbe {
    fn new(clock: ManualClock, steps: Vec<Probe>) -> Self {
        Self {
            clock,
            script: Mutex::new(steps.into()),
        }
    }
}

#[async_trait]
impl HttpClient for ScriptedProbe {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse> {
        let step = self
            .script
            .lock()
            .pop_front()
            .unwrap_or(Probe::TransportError);

        match step {
            Probe::Ok { latency_ms, status } => {
                self.clock.advance_millis(latency_ms);
                Ok(HttpResponse {
                    status,
                    headers: HashMap::new(),
                    body: Bytes::from_static(b"{\"status\":\"healthy\"}"),
                })
            }
            Probe::TransportError => Err(BridgeError::ConnectionRefused("probe".to_string())),
        }
    }
}

fn monitor_with_script(steps: Vec<Probe>) -> (Arc<NetworkHealthMonitor>, ManualClock) {
    let clock = ManualClock::at_millis(1_000_000);
    let probe = Arc::new(ScriptedProbe::new(clock.clone(), steps));
    let monitor = NetworkHealthMonitor::new(
        probe,
        Arc::new(clock.clone()),
        MonitorConfig::new("http://localhost:8000/api/health"),
    )
    .unwrap();
    (Arc::new(monitor), clock)
}

#[tokio::test]
async fn three_failed_probes_reach_offline() {
    let (monitor, _clock) = monitor_with_script(vec![
        Probe::TransportError,
        Probe::TransportError,
        Probe::TransportError,
    ]);

    assert_eq!(monitor.status(), ConnectionStatus::Online); // optimistic start
    assert_eq!(monitor.probe_once().await, ConnectionStatus::Slow);
    assert_eq!(monitor.probe_once().await, ConnectionStatus::Slow);
    assert_eq!(monitor.probe_once().await, ConnectionStatus::Offline);
}

#[tokio::test]
async fn fast_success_recovers_from_any_state() {
    let (monitor, _clock) = monitor_with_script(vec![
        Probe::TransportError,
        Probe::TransportError,
        Probe::TransportError,
        Probe::Ok {
            latency_ms: 50,
            status: 200,
        },
    ]);

    for _ in 0..3 {
        monitor.probe_once().await;
    }
    assert_eq!(monitor.status(), ConnectionStatus::Offline);

    assert_eq!(monitor.probe_once().await, ConnectionStatus::Online);

    let quality = monitor.quality();
    assert_eq!(quality.latency_millis, 50);
    assert!(quality.is_reliable);
}

#[tokio::test]
async fn slow_success_classifies_slow() {
    let (monitor, _clock) = monitor_with_script(vec![Probe::Ok {
        latency_ms: 2_500,
        status: 200,
    }]);

    assert_eq!(monitor.probe_once().await, ConnectionStatus::Slow);
    // Slow but succeeding: latency disqualifies reliability.
    assert!(!monitor.quality().is_reliable);
}

#[tokio::test]
async fn non_success_status_counts_as_failure() {
    let mut mock = MockHttpClient::new();
    mock.expect_execute().returning(|_| {
        Ok(HttpResponse {
            status: 503,
            headers: HashMap::new(),
            body: Bytes::new(),
        })
    });

    let clock = ManualClock::default();
    let monitor = NetworkHealthMonitor::new(
        Arc::new(mock),
        Arc::new(clock),
        MonitorConfig::new("http://localhost:8000/api/health"),
    )
    .unwrap();

    assert_eq!(monitor.probe_once().await, ConnectionStatus::Slow);
}

#[tokio::test]
async fn predicates_follow_failure_count() {
    let (monitor, _clock) = monitor_with_script(vec![
        Probe::TransportError,
        Probe::TransportError,
        Probe::TransportError,
    ]);

    assert!(!monitor.should_use_offline_mode());
    assert!(monitor.should_retry());

    monitor.probe_once().await; // 1 failure -> Slow
    assert!(!monitor.should_use_offline_mode());
    assert!(monitor.should_retry());

    monitor.probe_once().await; // 2 failures -> Slow
    assert!(monitor.should_use_offline_mode());
    assert!(monitor.should_retry());

    monitor.probe_once().await; // 3 failures -> Offline
    assert!(monitor.should_use_offline_mode());
    assert!(!monitor.should_retry());
}

#[tokio::test]
async fn connectivity_edges_apply_immediately() {
    let (monitor, _clock) = monitor_with_script(vec![Probe::Ok {
        latency_ms: 30,
        status: 200,
    }]);

    monitor
        .notify_connectivity(ConnectivitySignal::Offline)
        .await;
    assert_eq!(monitor.status(), ConnectionStatus::Offline);

    // Online edge reprobes immediately and the scripted success confirms.
    monitor.notify_connectivity(ConnectivitySignal::Online).await;
    assert_eq!(monitor.status(), ConnectionStatus::Online);
}

#[tokio::test]
async fn subscribers_fire_on_transitions_only() {
    let (monitor, _clock) = monitor_with_script(vec![
        Probe::TransportError, // Online -> Slow
        Probe::TransportError, // Slow -> Slow (no transition)
        Probe::TransportError, // Slow -> Offline
    ]);

    let transitions = Arc::new(AtomicUsize::new(0));
    let counter = transitions.clone();
    monitor.on_status_change(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    for _ in 0..3 {
        monitor.probe_once().await;
    }

    assert_eq!(transitions.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn wait_for_connection_times_out() {
    let (monitor, _clock) = monitor_with_script(vec![Probe::TransportError; 3]);

    for _ in 0..3 {
        monitor.probe_once().await;
    }
    assert_eq!(monitor.status(), ConnectionStatus::Offline);

    assert!(!monitor.wait_for_connection(Duration::from_secs(1)).await);
}

#[tokio::test(start_paused = true)]
async fn wait_for_connection_wakes_on_recovery() {
    let (monitor, _clock) = monitor_with_script(vec![
        Probe::TransportError,
        Probe::TransportError,
        Probe::TransportError,
        Probe::Ok {
            latency_ms: 40,
            status: 200,
        },
    ]);

    for _ in 0..3 {
        monitor.probe_once().await;
    }

    let recovering = monitor.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        recovering.probe_once().await;
    });

    assert!(monitor.wait_for_connection(Duration::from_secs(5)).await);
    assert_eq!(monitor.status(), ConnectionStatus::Online);
}
