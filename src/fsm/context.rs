//! Per-cycle blackboard threaded through every state handler.
//!
//! The scheduler writes I/O results here (raw values and the publish
//! outcome); state handlers read them to choose the next state and
//! write the sleep decision back.

use crate::config::RigConfig;
use crate::sensors::RawValues;
use crate::sensors::reading::Batch;
use crate::telemetry::PublishOutcome;

pub struct CycleContext {
    // -- Cycle data (reset on entering Idle) --
    /// Raw values from the last acquisition.
    pub raw: RawValues,
    /// Classified readings of the current cycle.
    pub batch: Batch,
    /// Set in Validating when any reading is invalid.
    pub faulted: bool,
    /// Outcome of this cycle's publish, if one was attempted.
    pub publish: Option<PublishOutcome>,

    // -- Decisions --
    /// Delay chosen on entering Sleeping.
    pub sleep_ms: u32,

    // -- Configuration --
    pub cadence_ms: u32,
    pub fault_backoff_ms: u32,

    // -- Counters --
    /// Cycles started since boot.
    pub cycle: u64,
}

impl CycleContext {
    pub fn new(config: &RigConfig) -> Self {
        Self {
            raw: RawValues::new(),
            batch: Batch::new(),
            faulted: false,
            publish: None,
            sleep_ms: config.cadence_ms,
            cadence_ms: config.cadence_ms,
            fault_backoff_ms: config.fault_backoff_ms,
            cycle: 0,
        }
    }

    /// Drop everything that belongs to the previous cycle.
    pub fn reset_cycle(&mut self) {
        self.raw.clear();
        self.batch.clear();
        self.faulted = false;
        self.publish = None;
    }
}
