//! Connectivity monitor: the WiFi association state machine.
//!
//! ```text
//!  Disconnected ──start()──▶ Connecting ──[associated]──▶ Connected
//!       ▲                        │                           │
//!       │                  [timeout / begin err]        [link lost]
//!       │                        ▼                           │
//!       │                      Failed                        │
//!       │                        │                           ▼
//!       └──────[backoff elapsed: maintain()]──────────── Disconnected
//! ```
//!
//! Connecting is a bounded blocking poll on the scheduler thread.  After a
//! failed attempt or a lost link the next attempt waits an exponential
//! backoff (5 s → 10 s → 20 s … capped, by default at 300 s), so a missing
//! access point never turns into a reconnect spin.

use std::net::Ipv4Addr;

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Clock, EventSink, WifiLink};
use crate::config::RigConfig;
use crate::error::{Error, LinkError};

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), LinkError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(LinkError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), LinkError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(LinkError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// ConnectivityMonitor
// ───────────────────────────────────────────────────────────────

pub struct ConnectivityMonitor<L> {
    link: L,
    state: ConnectivityState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    connect_timeout_ms: u32,
    poll_interval_ms: u32,
    backoff_initial_ms: u32,
    backoff_max_ms: u32,
    /// Delay applied at the next failure.
    backoff_ms: u32,
    /// Earliest uptime at which `maintain()` may start a new attempt.
    retry_at_ms: Option<u64>,
    attempts: u32,
}

impl<L: WifiLink> ConnectivityMonitor<L> {
    pub fn new(link: L, config: &RigConfig) -> Self {
        Self {
            link,
            state: ConnectivityState::Disconnected,
            ssid: config.network.ssid.clone(),
            password: config.network.password.clone(),
            connect_timeout_ms: config.connect_timeout_ms,
            poll_interval_ms: config.connect_poll_interval_ms,
            backoff_initial_ms: config.reconnect_backoff_initial_ms,
            backoff_max_ms: config.reconnect_backoff_max_ms,
            backoff_ms: config.reconnect_backoff_initial_ms,
            retry_at_ms: None,
            attempts: 0,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn local_ip(&self) -> Option<Ipv4Addr> {
        self.link.local_ip()
    }

    /// Association attempts started since boot.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Uptime at which the next reconnect attempt is allowed.
    pub fn retry_at_ms(&self) -> Option<u64> {
        self.retry_at_ms
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot-time association: enter Connecting and block until Connected or
    /// the timeout bound elapses.
    pub fn start(
        &mut self,
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) -> ConnectivityState {
        self.connect(clock, sink)
    }

    /// Called once per cycle.  Detects a lost link and starts a new attempt
    /// once the backoff has elapsed.  Never more than one attempt per call.
    pub fn maintain(
        &mut self,
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) -> ConnectivityState {
        match self.state {
            ConnectivityState::Connected => {
                self.is_connected(clock, sink);
            }
            ConnectivityState::Disconnected | ConnectivityState::Failed => {
                let due = self.retry_at_ms.is_none_or(|at| clock.now_ms() >= at);
                if due {
                    info!("WiFi: reconnect attempt {} (state {:?})", self.attempts + 1, self.state);
                    self.connect(clock, sink);
                }
            }
            ConnectivityState::Connecting => {}
        }
        self.state
    }

    /// Live connectivity check.  A Connected monitor whose link dropped moves
    /// to Disconnected and schedules a reconnect.
    pub fn is_connected(&mut self, clock: &impl Clock, sink: &mut impl EventSink) -> bool {
        if self.state != ConnectivityState::Connected {
            return false;
        }
        if self.link.is_associated() {
            return true;
        }
        let now = clock.now_ms();
        warn!("WiFi: association lost");
        self.transition(ConnectivityState::Disconnected, now, sink);
        self.schedule_retry(now);
        false
    }

    // ── Internal ──────────────────────────────────────────────

    fn connect(&mut self, clock: &mut impl Clock, sink: &mut impl EventSink) -> ConnectivityState {
        self.attempts += 1;
        self.retry_at_ms = None;
        let started = clock.now_ms();
        self.transition(ConnectivityState::Connecting, started, sink);
        info!("WiFi: connecting to '{}'", self.ssid);

        let begun = validate_ssid(&self.ssid)
            .and_then(|()| validate_password(&self.password))
            .and_then(|()| self.link.begin(&self.ssid, &self.password));
        if let Err(e) = begun {
            error!("WiFi: cannot start association: {}", e);
            self.fail(clock.now_ms(), sink);
            return self.state;
        }

        let timeout = u64::from(self.connect_timeout_ms);
        loop {
            if self.link.is_associated() {
                let now = clock.now_ms();
                self.backoff_ms = self.backoff_initial_ms;
                self.transition(ConnectivityState::Connected, now, sink);
                info!(
                    "WiFi: connected after {} ms (IP={:?})",
                    now.saturating_sub(started),
                    self.link.local_ip()
                );
                return self.state;
            }

            let elapsed = clock.now_ms().saturating_sub(started);
            if elapsed >= timeout {
                warn!("WiFi: connection timed out after {} ms", elapsed);
                sink.emit(&AppEvent::Fault(Error::ConnectivityTimeout));
                self.fail(clock.now_ms(), sink);
                return self.state;
            }

            debug!("WiFi: waiting for association ({} ms)", elapsed);
            let remaining = (timeout - elapsed) as u32;
            clock.sleep_ms(self.poll_interval_ms.min(remaining));
        }
    }

    fn fail(&mut self, now: u64, sink: &mut impl EventSink) {
        self.transition(ConnectivityState::Failed, now, sink);
        self.schedule_retry(now);
    }

    fn schedule_retry(&mut self, now: u64) {
        let at = now + u64::from(self.backoff_ms);
        info!("WiFi: next attempt in {} s", self.backoff_ms / 1000);
        self.retry_at_ms = Some(at);
        self.backoff_ms = self.backoff_ms.saturating_mul(2).min(self.backoff_max_ms);
    }

    fn transition(&mut self, to: ConnectivityState, at_ms: u64, sink: &mut impl EventSink) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        sink.emit(&AppEvent::LinkChanged { from, to, at_ms });
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
