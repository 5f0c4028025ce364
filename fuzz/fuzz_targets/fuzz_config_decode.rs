//! Fuzz target: `ModuleConfig::from_bytes`
//!
//! Arbitrary bytes must either be rejected or decode into a configuration
//! that validates and survives a re-encode.
//!
//! cargo fuzz run fuzz_config_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaymod::config::ModuleConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = ModuleConfig::from_bytes(data) {
        assert!(cfg.validate().is_ok());
        let bytes = cfg.to_bytes().expect("valid config must encode");
        assert_eq!(ModuleConfig::from_bytes(&bytes).ok(), Some(cfg));
    }
});
