//! Connectivity monitor against a mock link and simulated clock.
//!
//! Covers the association bound, the reconnect backoff schedule and the
//! reset of that schedule after a successful association.

use crate::mock_hw::{MockLink, RecordingSink, SimClock, rig_config};

use tecrig::app::events::AppEvent;
use tecrig::config::RigConfig;
use tecrig::connectivity::{ConnectivityMonitor, ConnectivityState};
use tecrig::error::Error;

fn fast_config() -> RigConfig {
    let mut c = rig_config();
    c.connect_timeout_ms = 1_000;
    c.connect_poll_interval_ms = 100;
    c
}

/// Retry gaps observed over `attempts` failed attempts.
fn backoff_gaps(config: &RigConfig, attempts: usize) -> Vec<u64> {
    let mut clock = SimClock::default();
    let mut sink = RecordingSink::default();
    let mut m = ConnectivityMonitor::new(MockLink::unreachable(), config);
    m.start(&mut clock, &mut sink);

    let mut gaps = Vec::new();
    for _ in 0..attempts {
        let failed_at = clock.now();
        let retry_at = m.retry_at_ms().unwrap();
        gaps.push(retry_at - failed_at);
        clock.advance(retry_at - failed_at);
        m.maintain(&mut clock, &mut sink);
    }
    gaps
}

#[test]
fn never_associating_fails_exactly_once_at_the_bound() {
    let config = rig_config();
    let mut clock = SimClock::default();
    let mut sink = RecordingSink::default();
    let mut m = ConnectivityMonitor::new(MockLink::unreachable(), &config);

    assert_eq!(m.start(&mut clock, &mut sink), ConnectivityState::Failed);

    let failed = sink.link_changes_to(ConnectivityState::Failed);
    assert_eq!(failed.len(), 1);
    assert!(failed[0] >= u64::from(config.connect_timeout_ms));
    assert!(failed[0] < u64::from(config.connect_timeout_ms + config.connect_poll_interval_ms));
    assert_eq!(sink.link_changes_to(ConnectivityState::Connecting), [0]);
    assert_eq!(
        sink.count(|e| *e == AppEvent::Fault(Error::ConnectivityTimeout)),
        1
    );
}

#[test]
fn association_within_bound_never_fails() {
    let config = rig_config();
    let mut clock = SimClock::default();
    let mut sink = RecordingSink::default();
    let link = MockLink::associating_after(59);
    let mut m = ConnectivityMonitor::new(link, &config);

    assert_eq!(m.start(&mut clock, &mut sink), ConnectivityState::Connected);
    assert!(sink.link_changes_to(ConnectivityState::Failed).is_empty());
    assert_eq!(clock.now(), 29_500);
}

#[test]
fn reconnect_backoff_doubles() {
    assert_eq!(backoff_gaps(&fast_config(), 4), [5_000, 10_000, 20_000, 40_000]);
}

#[test]
fn reconnect_backoff_is_capped() {
    let mut config = fast_config();
    config.reconnect_backoff_max_ms = 15_000;
    assert_eq!(backoff_gaps(&config, 4), [5_000, 10_000, 15_000, 15_000]);
}

#[test]
fn no_attempt_before_backoff_elapses() {
    let config = fast_config();
    let mut clock = SimClock::default();
    let mut sink = RecordingSink::default();
    let link = MockLink::unreachable();
    let mut m = ConnectivityMonitor::new(link.clone(), &config);
    m.start(&mut clock, &mut sink);

    for _ in 0..40 {
        clock.advance(100);
        m.maintain(&mut clock, &mut sink);
    }
    assert_eq!(link.begins(), 1);
    assert_eq!(m.state(), ConnectivityState::Failed);
}

#[test]
fn backoff_resets_after_connect() {
    let config = fast_config();
    let mut clock = SimClock::default();
    let mut sink = RecordingSink::default();
    let link = MockLink::unreachable();
    let mut m = ConnectivityMonitor::new(link.clone(), &config);

    m.start(&mut clock, &mut sink);
    clock.advance(5_000);
    m.maintain(&mut clock, &mut sink);
    assert_eq!(m.attempts(), 2);

    link.restore();
    clock.advance(10_000);
    assert_eq!(m.maintain(&mut clock, &mut sink), ConnectivityState::Connected);
    assert_eq!(m.retry_at_ms(), None);

    link.drop_link();
    let lost_at = clock.now();
    assert!(!m.is_connected(&clock, &mut sink));
    assert_eq!(m.state(), ConnectivityState::Disconnected);
    assert_eq!(m.retry_at_ms(), Some(lost_at + 5_000));
}

#[test]
fn invalid_credentials_fail_without_association() {
    let mut config = rig_config();
    config.network.set_password("short").unwrap();
    let mut clock = SimClock::default();
    let mut sink = RecordingSink::default();
    let link = MockLink::associating_after(0);
    let mut m = ConnectivityMonitor::new(link.clone(), &config);

    assert_eq!(m.start(&mut clock, &mut sink), ConnectivityState::Failed);
    assert_eq!(link.begins(), 0);
    assert_eq!(clock.now(), 0);
}
