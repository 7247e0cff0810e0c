//! Probe identity, per-cycle readings and the batch they form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of probes on the bus (sizes every per-cycle buffer).
pub const MAX_PROBES: usize = 8;

/// Capacity of label strings (sensor ids, role names, sensor type).
pub const LABEL_LEN: usize = 16;

/// Short fixed-capacity label.
pub type Label = heapless::String<LABEL_LEN>;

/// Value the bus driver returns for a probe that did not answer.
///
/// Matches the DallasTemperature `DEVICE_DISCONNECTED_C` code, so raw values
/// coming from any Dallas-compatible driver can be compared directly.
pub const DEVICE_DISCONNECTED_C: f32 = -127.0;

/// Build a [`heapless::String`] from `s`, truncating at capacity.  For
/// labels and display text only; network settings go through the checked
/// setters on [`NetworkConfig`](crate::config::NetworkConfig).
pub fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// ProbeId
// ---------------------------------------------------------------------------

/// 64-bit 1-wire ROM code: family byte, 48-bit serial, CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeId(pub [u8; 8]);

impl ProbeId {
    /// Family codes of the Dallas/Maxim thermometers the bus driver speaks.
    const THERMOMETER_FAMILIES: [u8; 5] = [0x10, 0x22, 0x28, 0x3B, 0x42];

    pub const fn new(rom: [u8; 8]) -> Self {
        Self(rom)
    }

    pub fn family_code(&self) -> u8 {
        self.0[0]
    }

    pub fn is_thermometer(&self) -> bool {
        Self::THERMOMETER_FAMILIES.contains(&self.family_code())
    }

    /// ROM code as the little-endian `u64` most 1-wire stacks use.
    pub fn as_u64(&self) -> u64 {
        u64::from_le_bytes(self.0)
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reading / Batch
// ---------------------------------------------------------------------------

/// One probe's value for one cycle.  Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub probe_id: ProbeId,
    /// Identifier published as `sensor_id`.
    pub sensor_id: Label,
    /// Role label published as `sensor_name` (e.g. `Block1_Hot`).
    pub name: Label,
    /// Temperature in °C as returned by the bus.
    pub value: f32,
    pub valid: bool,
}

/// Readings of one cycle, in probe declaration order.
pub type Batch = heapless::Vec<Reading, MAX_PROBES>;

/// Index of the first faulted reading, if any.
pub fn first_fault(batch: &Batch) -> Option<usize> {
    batch.iter().position(|r| !r.valid)
}
