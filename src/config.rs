//! System configuration parameters
//!
//! All tunable parameters for the ZoneDrive controller.
//! Values can be overridden via NVS (non-volatile storage) at provisioning
//! time; the drive stack is constructed from a validated snapshot at boot.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::drivers::valve::RestoreMode;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Fan ---
    /// Number of discrete fan speed steps (level 0..=speed_count).
    pub fan_speed_count: u16,

    // --- Zone valves ---
    /// Time a valve actuator needs to travel between end states (ms).
    /// Geared ball-valve actuators are slow; 15 s is typical.
    pub valve_switching_time_ms: u32,
    /// Boot-time restore policy for valve position.
    pub valve_restore_mode: RestoreMode,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Fan
            fan_speed_count: 100,

            // Valves
            valve_switching_time_ms: 15_000,
            valve_restore_mode: RestoreMode::RestoreDefaultOff,

            // Timing
            control_loop_interval_ms: 100, // 10 Hz
            telemetry_interval_secs: 60,   // 1/min
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Called before persistence and before the
    /// drive stack is constructed — the drivers themselves never see an
    /// invalid configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=1000).contains(&self.fan_speed_count) {
            return Err(ConfigError::ValidationFailed(
                "fan_speed_count must be 1–1000",
            ));
        }
        if !(100..=600_000).contains(&self.valve_switching_time_ms) {
            return Err(ConfigError::ValidationFailed(
                "valve_switching_time_ms must be 100–600000",
            ));
        }
        if !(10..=5000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 10–5000",
            ));
        }
        if !(5..=3600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 5–3600",
            ));
        }
        Ok(())
    }
}
