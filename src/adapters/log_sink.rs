//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Every record is one line with a fixed tag so serial captures can be
//! filtered with `grep`.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    emitted: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self { emitted: 0 }
    }

    /// Events written since boot.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted += 1;
        match event {
            AppEvent::Started { probes } => {
                info!("START | probes={}", probes);
            }
            AppEvent::LinkChanged { from, to, at_ms } => {
                info!("LINK | {:?} -> {:?} | t={}ms", from, to, at_ms);
            }
            AppEvent::Fault(e) => {
                warn!("FAULT | {}", e);
            }
            AppEvent::Published { status, readings } => {
                info!("PUB | HTTP {} | readings={}", status, readings);
            }
            AppEvent::CycleCompleted(s) => {
                info!(
                    "CYCLE | #{} | faulted={} published={} | sleep={}ms",
                    s.cycle, s.faulted, s.published, s.sleep_ms
                );
            }
        }
    }
}
