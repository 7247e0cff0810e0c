//! Port traits: the hexagonal boundary between the cycle logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CycleScheduler (domain)
//! ```
//!
//! Driven adapters (1-wire bus, LCD, WiFi, HTTP, clock, event sink) implement
//! these traits.  Each component of the cycle owns exactly one handle, handed
//! over at construction, so no port is ever shared or locked.

use std::net::Ipv4Addr;

use crate::error::{LinkError, TransportError};
use crate::sensors::reading::ProbeId;

// ───────────────────────────────────────────────────────────────
// Sensor bus port (driven adapter: 1-wire → domain)
// ───────────────────────────────────────────────────────────────

/// Multi-drop temperature bus (DS18B20 family).
pub trait TemperatureBus {
    /// Broadcast "convert T" to every probe and block until conversion is
    /// guaranteed complete.  The wait is bounded by the driver.
    fn request_conversion(&mut self);

    /// Calibrated value in °C for `probe`, or
    /// [`DEVICE_DISCONNECTED_C`](crate::sensors::reading::DEVICE_DISCONNECTED_C)
    /// when the probe cannot be resolved.
    fn read_celsius(&mut self, probe: &ProbeId) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → character LCD)
// ───────────────────────────────────────────────────────────────

/// Addressable character grid.  Writes are assumed to succeed.
pub trait CharDisplay {
    fn clear(&mut self);
    fn set_cursor(&mut self, col: u8, row: u8);
    /// Write `text` at the cursor, advancing it.
    fn print(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Wireless link port (driven adapter: WiFi STA → domain)
// ───────────────────────────────────────────────────────────────

/// Station-mode association stack.
pub trait WifiLink {
    /// Start associating with `ssid`.  Returns immediately; progress is
    /// observed through [`is_associated`](Self::is_associated).
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), LinkError>;

    /// Whether the link is associated and has an address.
    fn is_associated(&mut self) -> bool;

    /// Station address once associated.
    fn local_ip(&self) -> Option<Ipv4Addr>;
}

// ───────────────────────────────────────────────────────────────
// HTTP port (driven adapter: domain → ingestion endpoint)
// ───────────────────────────────────────────────────────────────

/// Status and (possibly truncated) body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Outbound request transport.  Every call opens and closes its own
/// connection; nothing is pooled across calls.
pub trait HttpClient {
    fn post_json(
        &mut self,
        url: &str,
        body: &[u8],
        timeout_ms: u32,
    ) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic clock plus the single blocking delay the scheduler uses.
pub trait Clock {
    /// Milliseconds since boot.
    fn now_ms(&self) -> u64;

    /// Block the calling (and only) thread for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / diagnostics)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
