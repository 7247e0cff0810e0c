//! Sensor subsystem: probe acquisition and reading validation.
//!
//! [`SensorReader`] owns the bus handle and the probe table and produces one
//! [`Batch`] per cycle.  [`ReadingValidator`] decides which raw values are
//! usable.

pub mod reading;

use log::{debug, warn};

use crate::app::ports::TemperatureBus;
use crate::config::{ProbeConfig, RigConfig};
use reading::{Batch, DEVICE_DISCONNECTED_C, MAX_PROBES, ProbeId, Reading};

/// Raw values of one acquisition, in the order the probes were given.
pub type RawValues = heapless::Vec<f32, MAX_PROBES>;

// ───────────────────────────────────────────────────────────────
// ReadingValidator
// ───────────────────────────────────────────────────────────────

/// Classifies a raw value as valid or faulted.
///
/// Only the disconnected sentinel (and non-finite garbage) is rejected unless
/// a plausibility window is configured.  Out-of-datasheet values such as
/// 130 °C therefore pass by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadingValidator {
    range_c: Option<(f32, f32)>,
}

impl ReadingValidator {
    pub fn new(range_c: Option<(f32, f32)>) -> Self {
        Self { range_c }
    }

    /// DS18B20 datasheet bounds, for rigs that want them enforced.
    pub fn datasheet_bounds() -> Self {
        Self::new(Some((-55.0, 125.0)))
    }

    pub fn classify(&self, raw: f32) -> bool {
        if raw == DEVICE_DISCONNECTED_C || !raw.is_finite() {
            return false;
        }
        match self.range_c {
            Some((lo, hi)) => (lo..=hi).contains(&raw),
            None => true,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// SensorReader
// ───────────────────────────────────────────────────────────────

/// Owns the bus and turns one conversion into an ordered batch.
pub struct SensorReader<B> {
    bus: B,
    probes: heapless::Vec<ProbeConfig, MAX_PROBES>,
    validator: ReadingValidator,
}

impl<B: TemperatureBus> SensorReader<B> {
    pub fn new(bus: B, config: &RigConfig) -> Self {
        Self {
            bus,
            probes: config.probes.clone(),
            validator: ReadingValidator::new(config.plausible_range_c),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn probes(&self) -> &[ProbeConfig] {
        &self.probes
    }

    /// One conversion, then one read per probe id in the order given.
    /// Unresolvable probes come back as the sentinel; this never fails.
    pub fn acquire(&mut self, probe_ids: &[ProbeId]) -> RawValues {
        self.bus.request_conversion();
        probe_ids
            .iter()
            .take(MAX_PROBES)
            .map(|id| {
                let raw = self.bus.read_celsius(id);
                debug!("probe {}: {:.2} C", id, raw);
                raw
            })
            .collect()
    }

    /// Classify `raw` (as returned by [`acquire`](Self::acquire) over the
    /// configured probes) into readings.
    pub fn classify(&self, raw: &[f32]) -> Batch {
        self.probes
            .iter()
            .zip(raw)
            .map(|(probe, &value)| {
                let valid = self.validator.classify(value);
                if !valid {
                    warn!("probe {} ({}) faulted: {:.2}", probe.label, probe.address, value);
                }
                Reading {
                    probe_id: probe.address,
                    sensor_id: probe.sensor_id.clone(),
                    name: probe.label.clone(),
                    value,
                    valid,
                }
            })
            .collect()
    }

    /// Acquire every configured probe and classify the result.
    pub fn read_batch(&mut self) -> Batch {
        let ids: heapless::Vec<ProbeId, MAX_PROBES> =
            self.probes.iter().map(|p| p.address).collect();
        let raw = self.acquire(&ids);
        self.classify(&raw)
    }
}
