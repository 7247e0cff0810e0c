//! Mock hardware adapters for integration tests.
//!
//! Every mock keeps its state behind an `Rc<RefCell<_>>` so a test can hold
//! a second handle, change the simulated world between cycles (unplug a
//! probe, drop the link, script an HTTP reply) and inspect the full call
//! history afterwards.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::rc::Rc;

use tecrig::app::events::AppEvent;
use tecrig::app::ports::{
    CharDisplay, Clock, EventSink, HttpClient, HttpResponse, TemperatureBus, WifiLink,
};
use tecrig::config::RigConfig;
use tecrig::connectivity::ConnectivityState;
use tecrig::error::{LinkError, TransportError};
use tecrig::scheduler::{CycleScheduler, Peripherals};
use tecrig::sensors::reading::{DEVICE_DISCONNECTED_C, ProbeId};

// ── Temperature bus ───────────────────────────────────────────

#[derive(Default)]
pub struct BusState {
    pub values: Vec<(ProbeId, f32)>,
    pub conversions: u32,
    pub reads: u32,
}

#[derive(Clone, Default)]
pub struct MockBus(pub Rc<RefCell<BusState>>);

#[allow(dead_code)]
impl MockBus {
    pub fn set(&self, probe: ProbeId, value: f32) {
        let mut s = self.0.borrow_mut();
        match s.values.iter_mut().find(|(id, _)| *id == probe) {
            Some(slot) => slot.1 = value,
            None => s.values.push((probe, value)),
        }
    }

    pub fn conversions(&self) -> u32 {
        self.0.borrow().conversions
    }
}

impl TemperatureBus for MockBus {
    fn request_conversion(&mut self) {
        self.0.borrow_mut().conversions += 1;
    }

    fn read_celsius(&mut self, probe: &ProbeId) -> f32 {
        let mut s = self.0.borrow_mut();
        s.reads += 1;
        s.values
            .iter()
            .find(|(id, _)| id == probe)
            .map_or(DEVICE_DISCONNECTED_C, |(_, v)| *v)
    }
}

// ── Character display (grid emulator) ─────────────────────────

pub struct GridState {
    pub cells: Vec<Vec<char>>,
    pub col: usize,
    pub row: usize,
    pub clears: u32,
    /// Every banner or row text seen, in order.
    pub printed: Vec<String>,
}

#[derive(Clone)]
pub struct GridDisplay(pub Rc<RefCell<GridState>>);

#[allow(dead_code)]
impl GridDisplay {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self(Rc::new(RefCell::new(GridState {
            cells: vec![vec![' '; cols]; rows],
            col: 0,
            row: 0,
            clears: 0,
            printed: Vec::new(),
        })))
    }

    pub fn line(&self, row: usize) -> String {
        self.0.borrow().cells[row].iter().collect()
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().cells.iter().map(|r| r.iter().collect()).collect()
    }

    pub fn cell(&self, col: usize, row: usize) -> char {
        self.0.borrow().cells[row][col]
    }

    pub fn has_printed(&self, text: &str) -> bool {
        self.0.borrow().printed.iter().any(|p| p.contains(text))
    }
}

impl CharDisplay for GridDisplay {
    fn clear(&mut self) {
        let mut s = self.0.borrow_mut();
        s.clears += 1;
        for row in &mut s.cells {
            row.fill(' ');
        }
        s.col = 0;
        s.row = 0;
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        let mut s = self.0.borrow_mut();
        s.col = usize::from(col);
        s.row = usize::from(row);
    }

    fn print(&mut self, text: &str) {
        let mut s = self.0.borrow_mut();
        s.printed.push(text.to_string());
        for c in text.chars() {
            let (row, col) = (s.row, s.col);
            if let Some(cell) = s.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
                *cell = c;
            }
            s.col += 1;
        }
    }
}

// ── WiFi link ─────────────────────────────────────────────────

#[derive(Default)]
pub struct LinkState {
    /// `is_associated` turns true after this many polls of an attempt.
    pub associate_after: Option<u32>,
    pub polls: u32,
    pub begins: u32,
    pub up: bool,
}

#[derive(Clone, Default)]
pub struct MockLink(pub Rc<RefCell<LinkState>>);

#[allow(dead_code)]
impl MockLink {
    pub fn associating_after(polls: u32) -> Self {
        let link = Self::default();
        link.0.borrow_mut().associate_after = Some(polls);
        link
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn drop_link(&self) {
        let mut s = self.0.borrow_mut();
        s.up = false;
        s.associate_after = None;
    }

    pub fn restore(&self) {
        self.0.borrow_mut().associate_after = Some(0);
    }

    pub fn begins(&self) -> u32 {
        self.0.borrow().begins
    }
}

impl WifiLink for MockLink {
    fn begin(&mut self, _ssid: &str, _password: &str) -> Result<(), LinkError> {
        let mut s = self.0.borrow_mut();
        s.begins += 1;
        s.polls = 0;
        Ok(())
    }

    fn is_associated(&mut self) -> bool {
        let mut s = self.0.borrow_mut();
        s.polls += 1;
        if let Some(n) = s.associate_after {
            if s.polls > n {
                s.up = true;
            }
        }
        s.up
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        self.0.borrow().up.then(|| Ipv4Addr::new(192, 168, 1, 50))
    }
}

// ── HTTP client ───────────────────────────────────────────────

pub struct HttpState {
    /// Replies consumed in order; `default_reply` once exhausted.
    pub scripted: VecDeque<Result<HttpResponse, TransportError>>,
    pub default_reply: Result<HttpResponse, TransportError>,
    pub posts: Vec<(String, Vec<u8>)>,
}

#[derive(Clone)]
pub struct MockHttp(pub Rc<RefCell<HttpState>>);

#[allow(dead_code)]
impl MockHttp {
    pub fn replying(status: u16) -> Self {
        Self(Rc::new(RefCell::new(HttpState {
            scripted: VecDeque::new(),
            default_reply: Ok(HttpResponse { status, body: String::new() }),
            posts: Vec::new(),
        })))
    }

    pub fn script(&self, reply: Result<HttpResponse, TransportError>) {
        self.0.borrow_mut().scripted.push_back(reply);
    }

    pub fn post_count(&self) -> usize {
        self.0.borrow().posts.len()
    }

    pub fn last_body(&self) -> Option<Vec<u8>> {
        self.0.borrow().posts.last().map(|(_, b)| b.clone())
    }
}

impl HttpClient for MockHttp {
    fn post_json(
        &mut self,
        url: &str,
        body: &[u8],
        _timeout_ms: u32,
    ) -> Result<HttpResponse, TransportError> {
        let mut s = self.0.borrow_mut();
        s.posts.push((url.to_string(), body.to_vec()));
        match s.scripted.pop_front() {
            Some(reply) => reply,
            None => s.default_reply.clone(),
        }
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct ClockState {
    pub now_ms: u64,
    pub sleeps: Vec<u32>,
}

/// Simulated clock: time only moves when something sleeps.
#[derive(Clone, Default)]
pub struct SimClock(pub Rc<RefCell<ClockState>>);

#[allow(dead_code)]
impl SimClock {
    pub fn advance(&self, ms: u64) {
        self.0.borrow_mut().now_ms += ms;
    }

    pub fn now(&self) -> u64 {
        self.0.borrow().now_ms
    }

    pub fn last_sleep(&self) -> Option<u32> {
        self.0.borrow().sleeps.last().copied()
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.0.borrow().now_ms
    }

    fn sleep_ms(&mut self, ms: u32) {
        let mut s = self.0.borrow_mut();
        s.now_ms += u64::from(ms);
        s.sleeps.push(ms);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink(pub Rc<RefCell<Vec<AppEvent>>>);

#[allow(dead_code)]
impl RecordingSink {
    pub fn events(&self) -> Vec<AppEvent> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(e)).count()
    }

    pub fn link_changes_to(&self, to: ConnectivityState) -> Vec<u64> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                AppEvent::LinkChanged { to: t, at_ms, .. } if *t == to => Some(*at_ms),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}

// ── Assembled rig ─────────────────────────────────────────────

pub type MockScheduler =
    CycleScheduler<MockBus, GridDisplay, MockLink, MockHttp, SimClock, RecordingSink>;

/// Test-side handles onto every mock the scheduler owns.
#[allow(dead_code)]
pub struct Rig {
    pub bus: MockBus,
    pub display: GridDisplay,
    pub link: MockLink,
    pub http: MockHttp,
    pub clock: SimClock,
    pub sink: RecordingSink,
}

/// Default rig with credentials and an endpoint filled in.
pub fn rig_config() -> RigConfig {
    let mut c = RigConfig::default();
    c.network.set_ssid("RigNet").unwrap();
    c.network.set_password("peltier123").unwrap();
    c.network.set_endpoint_url("http://10.0.0.5:8000/api/readings").unwrap();
    c
}

/// Build a scheduler over mocks.  `values` are assigned to the configured
/// probes in declaration order.
pub fn build(config: &RigConfig, values: &[f32], link: MockLink) -> (MockScheduler, Rig) {
    let bus = MockBus::default();
    for (probe, &v) in config.probes.iter().zip(values) {
        bus.set(probe.address, v);
    }
    let rig = Rig {
        bus,
        display: GridDisplay::new(usize::from(config.lcd_cols), usize::from(config.lcd_rows)),
        link,
        http: MockHttp::replying(201),
        clock: SimClock::default(),
        sink: RecordingSink::default(),
    };
    let scheduler = CycleScheduler::new(
        config,
        Peripherals {
            bus: rig.bus.clone(),
            display: rig.display.clone(),
            link: rig.link.clone(),
            http: rig.http.clone(),
            clock: rig.clock.clone(),
            sink: rig.sink.clone(),
        },
    );
    (scheduler, rig)
}
