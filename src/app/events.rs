//! Outbound application events.
//!
//! The [`CycleScheduler`](crate::scheduler::CycleScheduler) and
//! [`ConnectivityMonitor`](crate::connectivity::ConnectivityMonitor) emit
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (serial log, test recorder).

use crate::connectivity::ConnectivityState;
use crate::error::Error;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The scheduler finished start-up with this many probes configured.
    Started { probes: usize },

    /// The connectivity state machine moved.
    LinkChanged {
        from: ConnectivityState,
        to: ConnectivityState,
        at_ms: u64,
    },

    /// A recoverable fault was observed.
    Fault(Error),

    /// A batch was accepted by the endpoint.
    Published { status: u16, readings: usize },

    /// One cycle ran to completion.
    CycleCompleted(CycleSummary),
}

/// Per-cycle summary suitable for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    pub cycle: u64,
    pub faulted: bool,
    pub published: bool,
    pub sleep_ms: u32,
}
