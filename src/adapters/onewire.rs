//! DS18B20 probes on a shared 1-wire bus.
//!
//! Implements [`TemperatureBus`].  One "convert T" broadcast starts every
//! probe at once; each probe is then read by ROM address.  Any bus or CRC
//! error on a read yields the disconnected sentinel, so a flaky probe looks
//! exactly like an unplugged one to the validator.
//!
//! - **`target_os = "espidf"`**: `one-wire-bus` + `ds18b20` over an
//!   open-drain GPIO with pull-up.
//! - **all other targets**: simulated probes with settable values.

use log::{info, warn};

use crate::app::ports::TemperatureBus;
use crate::sensors::reading::{DEVICE_DISCONNECTED_C, MAX_PROBES, ProbeId};

#[cfg(target_os = "espidf")]
use {
    anyhow::anyhow,
    ds18b20::{Ds18b20, Resolution},
    esp_idf_svc::hal::{
        delay::Ets,
        gpio::{AnyIOPin, InputOutput, PinDriver, Pull},
    },
    one_wire_bus::{Address, OneWire},
};

pub struct DallasBus {
    #[cfg(target_os = "espidf")]
    one_wire: OneWire<PinDriver<'static, AnyIOPin, InputOutput>>,
    #[cfg(target_os = "espidf")]
    delay: Ets,
    /// Simulation: current value per probe.
    #[cfg(not(target_os = "espidf"))]
    sim_values: heapless::Vec<(ProbeId, f32), MAX_PROBES>,
    conversions: u32,
}

// ── Construction ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl DallasBus {
    pub fn new(pin: AnyIOPin) -> anyhow::Result<Self> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_pull(Pull::Up)?;
        pin.set_high()?;
        let one_wire =
            OneWire::new(pin).map_err(|err| anyhow!("failed to initialize one-wire bus: {err:?}"))?;
        Ok(Self {
            one_wire,
            delay: Ets,
            conversions: 0,
        })
    }

    /// Enumerate every device on the bus and log what was found.
    pub fn scan(&mut self) -> heapless::Vec<ProbeId, MAX_PROBES> {
        let mut found = heapless::Vec::new();
        for addr in self.one_wire.devices(false, &mut self.delay) {
            match addr {
                Ok(address) => {
                    let id = ProbeId::new(address.0.to_le_bytes());
                    info!("1-wire: found {} (family 0x{:02X})", id, id.family_code());
                    if found.push(id).is_err() {
                        warn!("1-wire: more than {} devices, ignoring the rest", MAX_PROBES);
                        break;
                    }
                }
                Err(err) => {
                    warn!("1-wire: device scan failed: {err:?}");
                    break;
                }
            }
        }
        found
    }
}

#[cfg(not(target_os = "espidf"))]
impl DallasBus {
    /// Simulated bus holding `probes` at the given temperatures.
    pub fn new(probes: &[(ProbeId, f32)]) -> Self {
        Self {
            sim_values: probes.iter().copied().take(MAX_PROBES).collect(),
            conversions: 0,
        }
    }

    pub fn scan(&mut self) -> heapless::Vec<ProbeId, MAX_PROBES> {
        let found: heapless::Vec<ProbeId, MAX_PROBES> =
            self.sim_values.iter().map(|(id, _)| *id).collect();
        for id in &found {
            info!("1-wire(sim): found {}", id);
        }
        found
    }

    /// Change the simulated value of `probe`; unknown probes are ignored.
    pub fn set(&mut self, probe: ProbeId, value: f32) {
        if let Some(slot) = self.sim_values.iter_mut().find(|(id, _)| *id == probe) {
            slot.1 = value;
        }
    }

    /// Simulate `probe` being unplugged.
    pub fn unplug(&mut self, probe: ProbeId) {
        warn!("1-wire(sim): {} unplugged", probe);
        self.sim_values.retain(|(id, _)| *id != probe);
    }
}

impl DallasBus {
    pub fn conversions(&self) -> u32 {
        self.conversions
    }
}

// ── TemperatureBus ────────────────────────────────────────────

impl TemperatureBus for DallasBus {
    #[cfg(target_os = "espidf")]
    fn request_conversion(&mut self) {
        self.conversions = self.conversions.wrapping_add(1);
        if let Err(err) =
            ds18b20::start_simultaneous_temp_measurement(&mut self.one_wire, &mut self.delay)
        {
            warn!("1-wire: failed to start conversion: {err:?}");
            return;
        }
        Resolution::Bits12.delay_for_measurement_time(&mut self.delay);
    }

    #[cfg(not(target_os = "espidf"))]
    fn request_conversion(&mut self) {
        self.conversions = self.conversions.wrapping_add(1);
    }

    #[cfg(target_os = "espidf")]
    fn read_celsius(&mut self, probe: &ProbeId) -> f32 {
        let sensor = match Ds18b20::new::<core::convert::Infallible>(Address(probe.as_u64())) {
            Ok(sensor) => sensor,
            Err(err) => {
                warn!("1-wire: {} is not a DS18B20: {err:?}", probe);
                return DEVICE_DISCONNECTED_C;
            }
        };
        match sensor.read_data(&mut self.one_wire, &mut self.delay) {
            Ok(data) => data.temperature,
            Err(err) => {
                warn!("1-wire: read of {} failed: {err:?}", probe);
                DEVICE_DISCONNECTED_C
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_celsius(&mut self, probe: &ProbeId) -> f32 {
        self.sim_values
            .iter()
            .find(|(id, _)| id == probe)
            .map_or(DEVICE_DISCONNECTED_C, |(_, v)| *v)
    }
}
