//! Telemetry publisher: batch serialization and the single HTTP POST.
//!
//! ```text
//!   Batch ──records()──▶ [TelemetryRecord; N] ──serde_json──▶ JSON array
//!                                                                  │
//!                                             HttpClient::post_json┘
//! ```
//!
//! One request per healthy, connected cycle.  No retry inside the cycle;
//! the next cycle carries fresh values anyway.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::HttpClient;
use crate::config::RigConfig;
use crate::connectivity::ConnectivityState;
use crate::error::{Error, TransportError};
use crate::sensors::reading::{Batch, Label, MAX_PROBES};

/// Response bodies longer than this are cut before logging.
const LOGGED_BODY_MAX: usize = 128;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// One element of the posted JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub sensor_id: Label,
    pub sensor_name: Label,
    pub temperature: f32,
    pub sensor_type: Label,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<f32>,
}

/// Map a batch onto wire records, preserving order.
pub fn records(
    batch: &Batch,
    sensor_type: &str,
    battery_level: Option<f32>,
) -> heapless::Vec<TelemetryRecord, MAX_PROBES> {
    batch
        .iter()
        .map(|r| TelemetryRecord {
            sensor_id: r.sensor_id.clone(),
            sensor_name: r.name.clone(),
            temperature: r.value,
            sensor_type: crate::sensors::reading::bounded(sensor_type),
            battery_level,
        })
        .collect()
}

pub fn serialize_batch(
    batch: &Batch,
    sensor_type: &str,
    battery_level: Option<f32>,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&records(batch, sensor_type, battery_level))
}

/// Inverse of [`serialize_batch`], as the ingestion server would read it.
pub fn parse_payload(body: &[u8]) -> Result<Vec<TelemetryRecord>, serde_json::Error> {
    serde_json::from_slice(body)
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishOutcome {
    /// False when a precondition failed and no I/O happened.
    pub attempted: bool,
    pub http_status: Option<u16>,
    pub transport_error: Option<TransportError>,
}

impl PublishOutcome {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.attempted && self.http_status.is_some_and(|s| (200..300).contains(&s))
    }

    /// `Ok(None)` when skipped, `Ok(Some(status))` on 2xx.
    pub fn into_result(self) -> crate::error::Result<Option<u16>> {
        if !self.attempted {
            return Ok(None);
        }
        if let Some(e) = self.transport_error {
            return Err(Error::Transport(e));
        }
        match self.http_status {
            Some(status) if (200..300).contains(&status) => Ok(Some(status)),
            Some(status) => Err(Error::ServerRejected { status }),
            None => Err(Error::Transport(TransportError::Protocol)),
        }
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

pub struct TelemetryPublisher<H> {
    http: H,
    url: heapless::String<128>,
    sensor_type: Label,
    battery_level: Option<f32>,
    timeout_ms: u32,
    attempts: u32,
    successes: u32,
}

impl<H: HttpClient> TelemetryPublisher<H> {
    pub fn new(http: H, config: &RigConfig) -> Self {
        Self {
            http,
            url: config.network.endpoint_url.clone(),
            sensor_type: config.sensor_type.clone(),
            battery_level: config.battery_level,
            timeout_ms: config.http_timeout_ms,
            attempts: 0,
            successes: 0,
        }
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn successes(&self) -> u32 {
        self.successes
    }

    /// POST `batch` if the link is up and every reading is valid.
    pub fn publish(&mut self, batch: &Batch, link: ConnectivityState) -> PublishOutcome {
        if link != ConnectivityState::Connected {
            debug!("publish skipped: link {:?}", link);
            return PublishOutcome::skipped();
        }
        if batch.is_empty() || batch.iter().any(|r| !r.valid) {
            warn!("publish skipped: batch empty or contains faulted readings");
            return PublishOutcome::skipped();
        }
        if self.url.is_empty() {
            debug!("publish skipped: no endpoint configured");
            return PublishOutcome::skipped();
        }

        let body = match serialize_batch(batch, &self.sensor_type, self.battery_level) {
            Ok(body) => body,
            Err(e) => {
                warn!("publish skipped: cannot serialize batch: {}", e);
                return PublishOutcome::skipped();
            }
        };
        debug!("POST {} {}", self.url, String::from_utf8_lossy(&body));

        self.attempts += 1;
        match self.http.post_json(&self.url, &body, self.timeout_ms) {
            Ok(resp) => {
                if (200..300).contains(&resp.status) {
                    self.successes += 1;
                    info!("HTTP {}: {} readings accepted", resp.status, batch.len());
                } else {
                    let cut: String = resp.body.chars().take(LOGGED_BODY_MAX).collect();
                    warn!("HTTP {}: endpoint rejected batch: {}", resp.status, cut);
                }
                PublishOutcome {
                    attempted: true,
                    http_status: Some(resp.status),
                    transport_error: None,
                }
            }
            Err(e) => {
                warn!("HTTP POST failed: {}", e);
                PublishOutcome {
                    attempted: true,
                    http_status: None,
                    transport_error: Some(e),
                }
            }
        }
    }
}
