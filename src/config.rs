//! System configuration parameters
//!
//! Every tunable of the rig: the probe table, network identity, cadence and
//! timeout values, and the LCD geometry.  Loaded once at startup and
//! immutable thereafter.  `Default` reproduces the bench rig as wired.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sensors::reading::{Label, MAX_PROBES, ProbeId, bounded};

/// One probe on the bus and the role it plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// 1-wire ROM address.
    pub address: ProbeId,
    /// Identifier published as `sensor_id`.
    pub sensor_id: Label,
    /// Role label, published as `sensor_name`.
    pub label: Label,
    /// Short label for the LCD; falls back to `label`.
    #[serde(default)]
    pub display_label: Option<Label>,
}

impl ProbeConfig {
    pub fn new(address: [u8; 8], sensor_id: &str, label: &str, display_label: &str) -> Self {
        Self {
            address: ProbeId::new(address),
            sensor_id: bounded(sensor_id),
            label: bounded(label),
            display_label: Some(bounded(display_label)),
        }
    }

    /// Label shown on the display.
    pub fn screen_label(&self) -> &str {
        self.display_label.as_deref().unwrap_or(self.label.as_str())
    }
}

/// Network identity and ingestion endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
    /// Full URL including path, e.g. `http://10.0.0.5:8000/api/readings`.
    pub endpoint_url: heapless::String<128>,
}

impl NetworkConfig {
    pub fn set_ssid(&mut self, ssid: &str) -> Result<(), ConfigError> {
        self.ssid = exact(ssid, "ssid longer than 32 bytes")?;
        Ok(())
    }

    pub fn set_password(&mut self, password: &str) -> Result<(), ConfigError> {
        self.password = exact(password, "password longer than 64 bytes")?;
        Ok(())
    }

    pub fn set_endpoint_url(&mut self, url: &str) -> Result<(), ConfigError> {
        self.endpoint_url = exact(url, "endpoint_url longer than 128 bytes")?;
        Ok(())
    }
}

/// Copy `value` into a fixed-capacity field.  Values that do not fit are
/// rejected whole.
fn exact<const N: usize>(value: &str, err: &'static str) -> Result<heapless::String<N>, ConfigError> {
    let mut out = heapless::String::new();
    out.push_str(value).map_err(|()| ConfigError::ValidationFailed(err))?;
    Ok(out)
}

/// Core rig configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigConfig {
    // --- Probes ---
    /// Probes in declaration order (= display row = payload order).
    pub probes: heapless::Vec<ProbeConfig, MAX_PROBES>,
    /// Published as `sensor_type` for every reading.
    pub sensor_type: Label,
    /// Optional plausibility window (°C).  `None` accepts everything but the
    /// disconnected sentinel.
    #[serde(default)]
    pub plausible_range_c: Option<(f32, f32)>,

    // --- Network ---
    pub network: NetworkConfig,

    // --- Timing ---
    /// Sleep between healthy cycles (milliseconds)
    pub cadence_ms: u32,
    /// Sleep after a cycle with a faulted probe (milliseconds)
    pub fault_backoff_ms: u32,
    /// Wall-clock bound on one association attempt (milliseconds)
    pub connect_timeout_ms: u32,
    /// Association status poll interval while connecting (milliseconds)
    pub connect_poll_interval_ms: u32,
    /// First reconnect delay after a failed attempt (milliseconds)
    pub reconnect_backoff_initial_ms: u32,
    /// Reconnect delay ceiling (milliseconds)
    pub reconnect_backoff_max_ms: u32,
    /// Bound on one publish request (milliseconds)
    pub http_timeout_ms: u32,
    /// How long the "Connected" banner stays up at boot (milliseconds)
    pub connected_banner_ms: u32,

    // --- Display ---
    pub lcd_cols: u8,
    pub lcd_rows: u8,

    // --- Telemetry ---
    /// Placeholder battery level attached to every element when set.
    #[serde(default)]
    pub battery_level: Option<f32>,
}

impl Default for RigConfig {
    fn default() -> Self {
        let mut probes = heapless::Vec::new();
        for probe in [
            ProbeConfig::new([0x28, 0x5E, 0x26, 0x97, 0x94, 0x09, 0x03, 0xC6], "ds18b20_1", "Block1_Hot", "HOT1"),
            ProbeConfig::new([0x28, 0x78, 0x16, 0x94, 0x97, 0x0E, 0x03, 0x44], "ds18b20_2", "Block1_Cold", "COLD1"),
            ProbeConfig::new([0x28, 0xF5, 0x04, 0x97, 0x94, 0x04, 0x03, 0x90], "ds18b20_3", "Block2_Hot", "HOT2"),
            ProbeConfig::new([0x28, 0x0B, 0x34, 0x97, 0x94, 0x04, 0x03, 0x75], "ds18b20_4", "Block2_Cold", "COLD2"),
        ] {
            // Four entries always fit in MAX_PROBES.
            let _ = probes.push(probe);
        }

        Self {
            probes,
            sensor_type: bounded("DS18B20"),
            plausible_range_c: None,

            network: NetworkConfig::default(),

            cadence_ms: 1000,
            fault_backoff_ms: 5000,
            connect_timeout_ms: 30_000,
            connect_poll_interval_ms: 500,
            reconnect_backoff_initial_ms: 5_000,
            reconnect_backoff_max_ms: 300_000,
            http_timeout_ms: 5_000,
            connected_banner_ms: 2_000,

            lcd_cols: 20,
            lcd_rows: 4,

            battery_level: None,
        }
    }
}

impl RigConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Probe addresses in declaration order.
    pub fn probe_ids(&self) -> heapless::Vec<ProbeId, MAX_PROBES> {
        self.probes.iter().map(|p| p.address).collect()
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probes.is_empty() {
            return Err(ConfigError::ValidationFailed("at least one probe is required"));
        }
        for (i, probe) in self.probes.iter().enumerate() {
            if !probe.address.is_thermometer() {
                return Err(ConfigError::ValidationFailed(
                    "probe address is not a Dallas thermometer family code",
                ));
            }
            if probe.label.is_empty() || probe.sensor_id.is_empty() {
                return Err(ConfigError::ValidationFailed("probe label and sensor_id must be non-empty"));
            }
            if self.probes[..i].iter().any(|p| p.address == probe.address) {
                return Err(ConfigError::ValidationFailed("duplicate probe address"));
            }
        }
        if self.sensor_type.is_empty() {
            return Err(ConfigError::ValidationFailed("sensor_type must be non-empty"));
        }
        if let Some((lo, hi)) = self.plausible_range_c {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(ConfigError::ValidationFailed("plausible_range_c must be (low, high) with low < high"));
            }
        }
        if self.battery_level.is_some_and(|b| !b.is_finite()) {
            return Err(ConfigError::ValidationFailed("battery_level must be finite"));
        }

        let url = self.network.endpoint_url.as_str();
        if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed("endpoint_url must start with http:// or https://"));
        }

        if self.cadence_ms < 100 {
            return Err(ConfigError::ValidationFailed("cadence_ms must be >= 100"));
        }
        if self.fault_backoff_ms <= self.cadence_ms {
            return Err(ConfigError::ValidationFailed("fault_backoff_ms must exceed cadence_ms"));
        }
        if self.connect_poll_interval_ms == 0 || self.connect_poll_interval_ms >= self.connect_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "connect_poll_interval_ms must be > 0 and below connect_timeout_ms",
            ));
        }
        if self.reconnect_backoff_initial_ms == 0
            || self.reconnect_backoff_max_ms < self.reconnect_backoff_initial_ms
        {
            return Err(ConfigError::ValidationFailed(
                "reconnect backoff must be > 0 with max >= initial",
            ));
        }
        if !(100..=60_000).contains(&self.http_timeout_ms) {
            return Err(ConfigError::ValidationFailed("http_timeout_ms must be 100–60000"));
        }
        if !(8..=40).contains(&self.lcd_cols) || !(1..=4).contains(&self.lcd_rows) {
            return Err(ConfigError::ValidationFailed("LCD must be 8–40 columns by 1–4 rows"));
        }
        Ok(())
    }
}
