//! Fuzz target: `RigConfig::from_json`
//!
//! Feeds arbitrary bytes to the configuration loader.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Anything accepted passes `validate()` and survives a serialize/parse
//!   round trip unchanged
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use tecrig::config::RigConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = RigConfig::from_json(text) else {
        return;
    };

    assert!(config.validate().is_ok(), "from_json accepted an invalid config");
    assert!(!config.probes.is_empty());

    let json = serde_json::to_string(&config).expect("accepted config must serialize");
    let again = RigConfig::from_json(&json).expect("serialized config must parse");
    assert_eq!(config, again, "config changed across a round trip");
});
