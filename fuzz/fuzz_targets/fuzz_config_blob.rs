//! Fuzz target: `SystemConfig` NVS blob decoder
//!
//! Drives the postcard config decode + validation path with arbitrary
//! bytes and verifies:
//! - No panics under arbitrary byte inputs
//! - Any config that decodes is either rejected by validation or safe
//!   for the drive stack (nonzero speed count and switching time)
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use zonedrive::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(cfg) = postcard::from_bytes::<SystemConfig>(data) else {
        return;
    };

    if cfg.validate().is_ok() {
        assert!(cfg.fan_speed_count >= 1);
        assert!(cfg.valve_switching_time_ms >= 100);
        assert!(cfg.control_loop_interval_ms >= 10);
    }
});
