//! Outbound HTTP adapter.
//!
//! Implements [`HttpClient`]: one POST per call on a fresh connection,
//! closed before returning.  The request is bounded by the caller's
//! timeout; the response body is read up to [`MAX_BODY`] bytes.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` wrapped in the
//!   `embedded-svc` blocking client (HTTP and HTTPS via the cert bundle).
//! - **all other targets**: plain HTTP/1.1 over `std::net::TcpStream`, so
//!   the rig can post to a local ingestion server from the host.

use log::debug;

use crate::app::ports::{HttpClient, HttpResponse};
use crate::error::TransportError;

/// Response bytes kept for diagnostics.
pub const MAX_BODY: usize = 256;

/// Status line plus headers accepted before the body.
pub const MAX_HEAD: usize = 1024;

#[cfg(target_os = "espidf")]
use {
    core::time::Duration,
    embedded_svc::{
        http::{Method, client::Client},
        io::{Read, Write},
    },
    esp_idf_svc::{
        http::client::{Configuration, EspHttpConnection},
        io::EspIOError,
    },
};

#[cfg(not(target_os = "espidf"))]
use std::{
    io::{ErrorKind, Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

// ───────────────────────────────────────────────────────────────
// URL / response parsing (host transport)
// ───────────────────────────────────────────────────────────────

/// Parts of an `http://` URL needed to open a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint<'a> {
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
}

pub fn parse_url(url: &str) -> Result<Endpoint<'_>, TransportError> {
    let rest = url.strip_prefix("http://").ok_or(TransportError::InvalidUrl)?;
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().map_err(|_| TransportError::InvalidUrl)?),
        None => (authority, 80),
    };
    if host.is_empty() {
        return Err(TransportError::InvalidUrl);
    }
    Ok(Endpoint { host, port, path })
}

/// Status code from an `HTTP/1.x NNN reason` line.
pub fn parse_status_line(line: &str) -> Result<u16, TransportError> {
    let mut parts = line.split_whitespace();
    let version = parts.next().ok_or(TransportError::Protocol)?;
    if !version.starts_with("HTTP/1.") {
        return Err(TransportError::Protocol);
    }
    parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .filter(|code| (100..600).contains(code))
        .ok_or(TransportError::Protocol)
}

// ───────────────────────────────────────────────────────────────
// HttpAdapter
// ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct HttpAdapter {
    requests: u32,
}

impl HttpAdapter {
    pub fn new() -> Self {
        Self { requests: 0 }
    }

    pub fn requests(&self) -> u32 {
        self.requests
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_post(
        &mut self,
        url: &str,
        body: &[u8],
        timeout_ms: u32,
    ) -> Result<HttpResponse, TransportError> {
        fn classify(e: EspIOError, fallback: TransportError) -> TransportError {
            let code = e.0.code();
            if code == esp_idf_svc::sys::ESP_ERR_HTTP_EAGAIN as i32
                || code == esp_idf_svc::sys::ESP_ERR_TIMEOUT as i32
            {
                TransportError::Timeout
            } else {
                fallback
            }
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TransportError::InvalidUrl);
        }
        let config = Configuration {
            timeout: Some(Duration::from_millis(u64::from(timeout_ms))),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&config).map_err(|_| TransportError::Connect)?;
        let mut client = Client::wrap(conn);

        let len = body.len().to_string();
        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", len.as_str()),
        ];
        let mut request = client
            .request(Method::Post, url, &headers)
            .map_err(|e| classify(e, TransportError::Connect))?;
        request
            .write_all(body)
            .map_err(|e| classify(e, TransportError::Io))?;
        request.flush().map_err(|e| classify(e, TransportError::Io))?;
        let mut response = request.submit().map_err(|e| classify(e, TransportError::Io))?;

        let status = response.status();
        let mut buf = [0u8; MAX_BODY];
        let mut filled = 0;
        while filled < buf.len() {
            match response.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) => {
                    debug!("HTTP: body read stopped: {e:?}");
                    break;
                }
            }
        }
        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&buf[..filled]).into_owned(),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_post(
        &mut self,
        url: &str,
        body: &[u8],
        timeout_ms: u32,
    ) -> Result<HttpResponse, TransportError> {
        fn io_error(e: &std::io::Error, fallback: TransportError) -> TransportError {
            match e.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout,
                _ => fallback,
            }
        }

        let endpoint = parse_url(url)?;
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms.max(1)));
        let remaining = || {
            deadline
                .checked_duration_since(Instant::now())
                .filter(|d| !d.is_zero())
                .ok_or(TransportError::Timeout)
        };

        let addr = (endpoint.host, endpoint.port)
            .to_socket_addrs()
            .map_err(|_| TransportError::Connect)?
            .next()
            .ok_or(TransportError::Connect)?;

        let mut stream = TcpStream::connect_timeout(&addr, remaining()?)
            .map_err(|e| io_error(&e, TransportError::Connect))?;
        stream
            .set_write_timeout(Some(remaining()?))
            .map_err(|_| TransportError::Io)?;

        let head = format!(
            "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n",
            endpoint.path,
            endpoint.host,
            body.len()
        );
        stream
            .write_all(head.as_bytes())
            .and_then(|()| stream.write_all(body))
            .and_then(|()| stream.flush())
            .map_err(|e| io_error(&e, TransportError::Io))?;

        // The deadline covers the whole exchange, not each read.
        let limit = MAX_HEAD + MAX_BODY;
        let mut raw = Vec::with_capacity(512);
        let mut chunk = [0u8; 256];
        while raw.len() < limit {
            stream
                .set_read_timeout(Some(remaining()?))
                .map_err(|_| TransportError::Io)?;
            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => {
                    let take = n.min(limit - raw.len());
                    raw.extend_from_slice(&chunk[..take]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(io_error(&e, TransportError::Io)),
            }
        }
        if raw.len() >= limit {
            debug!("HTTP: response cut at {} bytes", limit);
        }

        let text = String::from_utf8_lossy(&raw);
        let status_line = text.lines().next().ok_or(TransportError::Protocol)?;
        let status = parse_status_line(status_line)?;
        let body: String = text
            .split_once("\r\n\r\n")
            .map_or("", |(_, b)| b)
            .chars()
            .take(MAX_BODY)
            .collect();
        Ok(HttpResponse { status, body })
    }
}

impl HttpClient for HttpAdapter {
    fn post_json(
        &mut self,
        url: &str,
        body: &[u8],
        timeout_ms: u32,
    ) -> Result<HttpResponse, TransportError> {
        self.requests = self.requests.wrapping_add(1);
        debug!("HTTP: POST {} ({} bytes, timeout {} ms)", url, body.len(), timeout_ms);
        self.platform_post(url, body, timeout_ms)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
