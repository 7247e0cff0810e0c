//! Fuzz target: URL and status-line parsing of the host HTTP transport
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A parsed status code is always in 100..600
//! - A parsed endpoint always has a non-empty host and a path starting '/'
//!
//! cargo fuzz run fuzz_http_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use tecrig::adapters::http::{parse_status_line, parse_url};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    if let Ok(status) = parse_status_line(&text) {
        assert!((100..600).contains(&status));
    }

    if let Ok(endpoint) = parse_url(&text) {
        assert!(!endpoint.host.is_empty());
        assert!(endpoint.path.starts_with('/'));
    }
});
