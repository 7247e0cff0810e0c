//! Unified error types for the rig firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! cycle scheduler's reporting uniform.  All variants are `Copy` so they can
//! be carried inside events and publish outcomes without allocation.
//!
//! Nothing here is fatal at runtime: the scheduler reports an error and
//! returns to sleeping, the next cycle being the retry vehicle.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A probe returned the disconnected sentinel or could not be resolved.
    /// `index` is the probe's declaration index.
    ProbeFault { index: usize },
    /// Association was not achieved within the configured bound.
    ConnectivityTimeout,
    /// The request could not be sent or no response arrived.
    Transport(TransportError),
    /// The endpoint answered with a non-2xx status.
    ServerRejected { status: u16 },
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbeFault { index } => write!(f, "probe {index} faulted"),
            Self::ConnectivityTimeout => write!(f, "WiFi association timed out"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::ServerRejected { status } => write!(f, "server rejected with HTTP {status}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint URL could not be parsed or uses an unsupported scheme.
    InvalidUrl,
    /// TCP/TLS connection could not be established.
    Connect,
    /// No response within the request timeout.
    Timeout,
    /// Read or write on an open connection failed.
    Io,
    /// Response was not a parseable HTTP status line.
    Protocol,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl => write!(f, "invalid endpoint URL"),
            Self::Connect => write!(f, "connect failed"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Io => write!(f, "I/O error"),
            Self::Protocol => write!(f, "malformed HTTP response"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Wireless link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// SSID empty, longer than 32 bytes, or not printable ASCII.
    InvalidSsid,
    /// Password not empty and outside 8–64 bytes.
    InvalidPassword,
    /// The association stack refused to start a connection.
    Driver,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::Driver => write!(f, "WiFi driver error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Input was not valid JSON for [`RigConfig`](crate::config::RigConfig).
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "config is not valid JSON"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Malformed => Self::Config("malformed JSON"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for TransportError {}
impl std::error::Error for LinkError {}
impl std::error::Error for ConfigError {}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
