//! End-to-end cycle tests: scheduler → FSM → sensors, LCD, HTTP.
//!
//! Each test wires a [`CycleScheduler`](tecrig::scheduler::CycleScheduler)
//! to the recording mocks and drives whole cycles on the host.

use crate::mock_hw::{MockLink, build, rig_config};

use tecrig::app::events::AppEvent;
use tecrig::app::ports::HttpResponse;
use tecrig::connectivity::ConnectivityState;
use tecrig::error::{Error, TransportError};
use tecrig::fsm::StateId;
use tecrig::render::{CONNECTED_BANNER, CONNECTING_BANNER, LINK_TIMEOUT_BANNER, PROBE_FAULT_BANNER};
use tecrig::sensors::reading::DEVICE_DISCONNECTED_C;
use tecrig::telemetry::parse_payload;

const HEALTHY_PATH: [StateId; 6] = [
    StateId::Idle,
    StateId::Acquiring,
    StateId::Validating,
    StateId::Rendering,
    StateId::Publishing,
    StateId::Sleeping,
];

const FAULT_PATH: [StateId; 4] = [
    StateId::Idle,
    StateId::Acquiring,
    StateId::Validating,
    StateId::Sleeping,
];

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_shows_connected_banner_then_clears() {
    let (mut s, rig) = build(&rig_config(), &[1.0, 2.0, 3.0, 4.0], MockLink::associating_after(2));
    assert_eq!(s.start(), ConnectivityState::Connected);

    assert!(rig.display.has_printed(CONNECTING_BANNER));
    assert!(rig.display.has_printed(CONNECTED_BANNER));
    assert!(rig.display.has_printed("IP: 192.168.1.50"));
    assert_eq!(rig.clock.last_sleep(), Some(2_000));
    assert!(rig.display.lines().iter().all(|l| l.trim().is_empty()));
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Started { probes: 4 })), 1);
}

#[test]
fn boot_without_access_point_shows_timeout() {
    let (mut s, rig) = build(&rig_config(), &[1.0, 2.0, 3.0, 4.0], MockLink::unreachable());
    assert_eq!(s.start(), ConnectivityState::Failed);
    assert_eq!(rig.display.line(0).trim_end(), LINK_TIMEOUT_BANNER);
    assert_eq!(rig.clock.now(), 30_000);
}

// ── Healthy cycle ─────────────────────────────────────────────

#[test]
fn healthy_cycle_renders_and_publishes() {
    let (mut s, rig) = build(&rig_config(), &[21.5, 4.0, 30.25, -1.0], MockLink::associating_after(0));
    s.start();
    let report = s.run_cycle();

    assert_eq!(report.path.as_slice(), &HEALTHY_PATH);
    assert!(!report.faulted());
    assert_eq!(report.batch.len(), 4);
    assert!(report.publish.is_success());
    assert_eq!(report.sleep_ms, 1_000);
    assert_eq!(rig.clock.last_sleep(), Some(1_000));
    assert_eq!(rig.bus.conversions(), 1);

    assert_eq!(rig.display.line(0).trim_end(), "HOT1: 21.50 C");
    assert_eq!(rig.display.line(1).trim_end(), "COLD1: 4.00 C");
    assert_eq!(rig.display.line(2).trim_end(), "HOT2: 30.25 C");
    assert_eq!(rig.display.line(3).trim_end(), "COLD2: -1.00 C");

    let body = rig.http.last_body().unwrap();
    let records = parse_payload(&body).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.sensor_name.as_str()).collect();
    assert_eq!(names, ["Block1_Hot", "Block1_Cold", "Block2_Hot", "Block2_Cold"]);
    assert!(records.iter().all(|r| r.battery_level.is_none()));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Published { status: 201, readings: 4 })),
        1
    );
}

#[test]
fn identical_cycles_leave_identical_display() {
    let (mut s, rig) = build(&rig_config(), &[25.0, 18.0, 22.0, 19.5], MockLink::associating_after(0));
    s.start();
    s.run_cycle();
    let first = rig.display.lines();
    s.run_cycle();
    assert_eq!(rig.display.lines(), first);
    assert_eq!(s.cycles(), 2);
}

// ── Probe fault ───────────────────────────────────────────────

#[test]
fn disconnected_probe_blocks_render_and_publish() {
    let (mut s, rig) = build(
        &rig_config(),
        &[25.0, DEVICE_DISCONNECTED_C, 22.0, 19.5],
        MockLink::associating_after(0),
    );
    s.start();
    let report = s.run_cycle();

    assert_eq!(report.path.as_slice(), &FAULT_PATH);
    assert_eq!(report.fault_index, Some(1));
    assert!(!report.batch[1].valid);
    assert!(report.batch[0].valid && report.batch[2].valid && report.batch[3].valid);
    assert!(!report.publish.attempted);
    assert_eq!(report.sleep_ms, 5_000);
    assert_eq!(rig.clock.last_sleep(), Some(5_000));

    assert_eq!(rig.http.post_count(), 0);
    assert_eq!(rig.display.line(0).trim_end(), PROBE_FAULT_BANNER);
    for row in 1..4 {
        assert_eq!(rig.display.line(row).trim(), "");
    }
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::Fault(Error::ProbeFault { index: 1 })),
        1
    );
}

#[test]
fn probe_recovery_restores_normal_cycle() {
    let config = rig_config();
    let (mut s, rig) = build(&config, &[25.0, DEVICE_DISCONNECTED_C, 22.0, 19.5], MockLink::associating_after(0));
    s.start();
    assert!(s.run_cycle().faulted());

    rig.bus.set(config.probes[1].address, 18.0);
    let report = s.run_cycle();
    assert_eq!(report.path.as_slice(), &HEALTHY_PATH);
    assert_eq!(rig.display.line(0).trim_end(), "HOT1: 25.00 C");
    assert_eq!(rig.http.post_count(), 1);
    assert_eq!(s.state(), StateId::Idle);
}

// ── Connectivity interplay ────────────────────────────────────

#[test]
fn failed_link_runs_display_only() {
    let (mut s, rig) = build(&rig_config(), &[21.5, 4.0, 30.25, -1.0], MockLink::unreachable());
    s.start();
    for _ in 0..3 {
        let report = s.run_cycle();
        assert_eq!(report.path.as_slice(), &HEALTHY_PATH);
        assert!(!report.publish.attempted);
        assert_ne!(report.link, ConnectivityState::Connected);
    }
    assert_eq!(rig.http.post_count(), 0);
    assert_eq!(rig.display.line(1).trim_end(), "COLD1: 4.00 C");
    assert_eq!(rig.display.cell(19, 0), '!');
}

#[test]
fn lost_link_stops_publishing_until_reconnect() {
    let (mut s, rig) = build(&rig_config(), &[21.5, 4.0, 30.25, -1.0], MockLink::associating_after(0));
    s.start();
    s.run_cycle();
    assert_eq!(rig.http.post_count(), 1);

    rig.link.drop_link();
    let report = s.run_cycle();
    assert_eq!(report.link, ConnectivityState::Disconnected);
    assert!(!report.publish.attempted);
    assert_eq!(rig.http.post_count(), 1);

    // Backoff not yet elapsed: no new association attempt.
    rig.link.restore();
    s.run_cycle();
    assert_eq!(rig.link.begins(), 1);
    assert_eq!(rig.http.post_count(), 1);

    rig.clock.advance(5_000);
    let report = s.run_cycle();
    assert_eq!(report.link, ConnectivityState::Connected);
    assert_eq!(rig.link.begins(), 2);
    assert_eq!(rig.http.post_count(), 2);
}

// ── Publish failures ──────────────────────────────────────────

#[test]
fn server_rejection_is_reported_not_retried() {
    let (mut s, rig) = build(&rig_config(), &[1.0, 2.0, 3.0, 4.0], MockLink::associating_after(0));
    rig.http.script(Ok(HttpResponse { status: 500, body: "boom".into() }));
    s.start();
    let report = s.run_cycle();

    assert!(report.publish.attempted && !report.publish.is_success());
    assert_eq!(report.publish.http_status, Some(500));
    assert_eq!(report.sleep_ms, 1_000);
    assert_eq!(rig.http.post_count(), 1);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::Fault(Error::ServerRejected { status: 500 })),
        1
    );

    assert!(s.run_cycle().publish.is_success());
}

#[test]
fn transport_failure_is_reported() {
    let (mut s, rig) = build(&rig_config(), &[1.0, 2.0, 3.0, 4.0], MockLink::associating_after(0));
    rig.http.script(Err(TransportError::Timeout));
    s.start();
    let report = s.run_cycle();
    assert_eq!(report.publish.transport_error, Some(TransportError::Timeout));
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::Fault(Error::Transport(TransportError::Timeout))),
        1
    );
}

#[test]
fn battery_level_attached_when_configured() {
    let mut config = rig_config();
    config.battery_level = Some(1.0);
    let (mut s, rig) = build(&config, &[1.0, 2.0, 3.0, 4.0], MockLink::associating_after(0));
    s.start();
    s.run_cycle();
    let records = parse_payload(&rig.http.last_body().unwrap()).unwrap();
    assert!(records.iter().all(|r| r.battery_level == Some(1.0)));
}

#[test]
fn every_cycle_emits_a_summary() {
    let (mut s, rig) = build(&rig_config(), &[1.0, 2.0, 3.0, 4.0], MockLink::associating_after(0));
    s.start();
    for _ in 0..3 {
        s.run_cycle();
    }
    let summaries: Vec<u64> = rig
        .sink
        .events()
        .iter()
        .filter_map(|e| match e {
            AppEvent::CycleCompleted(summary) => Some(summary.cycle),
            _ => None,
        })
        .collect();
    assert_eq!(summaries, [1, 2, 3]);
}
