//! Cycle scheduler: the single loop that drives the rig.
//!
//! [`CycleScheduler`] owns every component and their port handles.  For
//! each cycle it performs the I/O of the current FSM state, records the
//! result in the [`CycleContext`], then ticks the FSM, which decides where
//! to go next.
//!
//! ```text
//!  ┌────────────┬──────────────────────────────────────────────────────┐
//!  │ State      │ I/O performed before the tick                        │
//!  ├────────────┼──────────────────────────────────────────────────────┤
//!  │ Idle       │ ConnectivityMonitor::maintain (reconnect w/ backoff) │
//!  │ Acquiring  │ one conversion + one read per probe                  │
//!  │ Validating │ classify raw values into the batch                   │
//!  │ Rendering  │ probe rows + link glyph on the LCD                   │
//!  │ Publishing │ live link check, then at most one POST               │
//!  │ Sleeping   │ cadence or fault backoff delay                       │
//!  └────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! A faulted Validating step jumps straight to Sleeping; the scheduler
//! then puts the fault banner on the LCD in place of the probe rows.

use log::{debug, info, warn};

use crate::app::events::{AppEvent, CycleSummary};
use crate::app::ports::{CharDisplay, Clock, EventSink, HttpClient, TemperatureBus, WifiLink};
use crate::config::RigConfig;
use crate::connectivity::{ConnectivityMonitor, ConnectivityState};
use crate::error::Error;
use crate::fsm::context::CycleContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::render::{CONNECTED_BANNER, CONNECTING_BANNER, LINK_TIMEOUT_BANNER, StatusRenderer};
use crate::sensors::SensorReader;
use crate::sensors::reading::{Batch, MAX_PROBES, ProbeId, first_fault};
use crate::telemetry::{PublishOutcome, TelemetryPublisher};

/// What happened in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub cycle: u64,
    pub batch: Batch,
    /// Declaration index of the first invalid reading.
    pub fault_index: Option<usize>,
    pub link: ConnectivityState,
    pub publish: PublishOutcome,
    pub sleep_ms: u32,
    /// States visited, Idle through Sleeping.
    pub path: heapless::Vec<StateId, { StateId::COUNT }>,
}

impl CycleReport {
    pub fn faulted(&self) -> bool {
        self.fault_index.is_some()
    }
}

/// Port handles the scheduler takes ownership of.
pub struct Peripherals<B, D, L, H, C, E> {
    pub bus: B,
    pub display: D,
    pub link: L,
    pub http: H,
    pub clock: C,
    pub sink: E,
}

pub struct CycleScheduler<B, D, L, H, C, E> {
    reader: SensorReader<B>,
    renderer: StatusRenderer<D>,
    monitor: ConnectivityMonitor<L>,
    publisher: TelemetryPublisher<H>,
    clock: C,
    sink: E,
    fsm: Fsm,
    ctx: CycleContext,
    probe_ids: heapless::Vec<ProbeId, MAX_PROBES>,
    connected_banner_ms: u32,
}

impl<B, D, L, H, C, E> CycleScheduler<B, D, L, H, C, E>
where
    B: TemperatureBus,
    D: CharDisplay,
    L: WifiLink,
    H: HttpClient,
    C: Clock,
    E: EventSink,
{
    /// Wire components from `config`.  Does not touch hardware; call
    /// [`start`](Self::start) next.
    pub fn new(config: &RigConfig, p: Peripherals<B, D, L, H, C, E>) -> Self {
        Self {
            reader: SensorReader::new(p.bus, config),
            renderer: StatusRenderer::new(p.display, config),
            monitor: ConnectivityMonitor::new(p.link, config),
            publisher: TelemetryPublisher::new(p.http, config),
            clock: p.clock,
            sink: p.sink,
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: CycleContext::new(config),
            probe_ids: config.probe_ids(),
            connected_banner_ms: config.connected_banner_ms,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot sequence: startup banners and the first association attempt.
    /// Returns the link state reached; anything but Connected leaves the rig
    /// in display-only mode until a later reconnect succeeds.
    pub fn start(&mut self) -> ConnectivityState {
        self.fsm.start(&mut self.ctx);
        self.sink.emit(&AppEvent::Started {
            probes: self.probe_ids.len(),
        });
        info!("scheduler started with {} probes", self.probe_ids.len());

        self.renderer.render_banner(&[CONNECTING_BANNER]);
        let state = self.monitor.start(&mut self.clock, &mut self.sink);

        if state == ConnectivityState::Connected {
            let ip = match self.monitor.local_ip() {
                Some(ip) => format!("IP: {}", ip),
                None => String::from("IP: -"),
            };
            self.renderer.render_banner(&[CONNECTED_BANNER, ip.as_str()]);
            self.clock.sleep_ms(self.connected_banner_ms);
            self.renderer.render_banner(&[]);
        } else {
            self.renderer.render_banner(&[LINK_TIMEOUT_BANNER]);
            warn!("starting in display-only mode (link {:?})", state);
        }
        state
    }

    /// Run one cycle, Idle through Sleeping, including the sleep itself.
    pub fn run_cycle(&mut self) -> CycleReport {
        let mut path = heapless::Vec::new();
        // Cannot overflow: each state is visited at most once per cycle.
        let _ = path.push(self.fsm.current_state());
        while self.fsm.current_state() != StateId::Sleeping {
            self.step();
            if path.push(self.fsm.current_state()).is_err() {
                break;
            }
        }

        let report = CycleReport {
            cycle: self.ctx.cycle,
            batch: self.ctx.batch.clone(),
            fault_index: first_fault(&self.ctx.batch),
            link: self.monitor.state(),
            publish: self.ctx.publish.unwrap_or_default(),
            sleep_ms: self.ctx.sleep_ms,
            path,
        };
        self.sink.emit(&AppEvent::CycleCompleted(CycleSummary {
            cycle: report.cycle,
            faulted: self.ctx.faulted,
            published: report.publish.is_success(),
            sleep_ms: report.sleep_ms,
        }));

        self.clock.sleep_ms(self.ctx.sleep_ms);
        self.fsm.tick(&mut self.ctx);
        report
    }

    /// The firmware main loop.
    pub fn run(&mut self) -> ! {
        loop {
            self.run_cycle();
        }
    }

    // ── Per-state I/O ─────────────────────────────────────────

    fn step(&mut self) {
        let state = self.fsm.current_state();
        match state {
            StateId::Idle => {
                self.monitor.maintain(&mut self.clock, &mut self.sink);
            }
            StateId::Acquiring => {
                self.ctx.raw = self.reader.acquire(&self.probe_ids);
            }
            StateId::Validating => {
                self.ctx.batch = self.reader.classify(&self.ctx.raw);
            }
            StateId::Rendering => {
                self.renderer.render(&self.ctx.batch);
                self.renderer.render_link_indicator(self.monitor.state());
            }
            StateId::Publishing => self.publish(),
            StateId::Sleeping => {}
        }

        self.fsm.tick(&mut self.ctx);

        if state == StateId::Validating && self.ctx.faulted {
            let index = first_fault(&self.ctx.batch).unwrap_or(0);
            self.sink.emit(&AppEvent::Fault(Error::ProbeFault { index }));
            self.renderer.render_probe_fault();
            self.renderer.render_link_indicator(self.monitor.state());
        }
    }

    fn publish(&mut self) {
        let link = if self.monitor.is_connected(&self.clock, &mut self.sink) {
            ConnectivityState::Connected
        } else {
            self.monitor.state()
        };

        let outcome = self.publisher.publish(&self.ctx.batch, link);
        if outcome.attempted {
            match outcome.into_result() {
                Ok(Some(status)) => self.sink.emit(&AppEvent::Published {
                    status,
                    readings: self.ctx.batch.len(),
                }),
                Ok(None) => {}
                Err(e) => self.sink.emit(&AppEvent::Fault(e)),
            }
        } else {
            debug!("cycle {}: publish not attempted", self.ctx.cycle);
        }
        self.ctx.publish = Some(outcome);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn cycles(&self) -> u64 {
        self.ctx.cycle
    }

    pub fn link_state(&self) -> ConnectivityState {
        self.monitor.state()
    }

    pub fn reader(&self) -> &SensorReader<B> {
        &self.reader
    }

    pub fn renderer(&self) -> &StatusRenderer<D> {
        &self.renderer
    }

    pub fn monitor(&self) -> &ConnectivityMonitor<L> {
        &self.monitor
    }

    pub fn publisher(&self) -> &TelemetryPublisher<H> {
        &self.publisher
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }
}
