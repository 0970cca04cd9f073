//! Application service — the hexagonal core.
//!
//! [`ZoneService`] owns the fan driver and every valve actuator instance.
//! It applies the boot restore policy, runs the per-tick orchestration,
//! persists completed valve transitions, and dispatches typed commands.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  AppCommand ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │      ZoneService        │
//!  StoragePort ◀──│  Fan · Valves · Restore │──▶ OutputPins (owned)
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::drivers::fan::HBridgeFan;
use crate::drivers::valve::ValveActuator;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{EventSink, StorageError, StoragePort};

/// Maximum number of valve actuator instances (stack-allocated slots).
pub const MAX_VALVES: usize = 4;

/// NVS namespace holding one position record per valve instance key.
const VALVE_NAMESPACE: &str = "valve";

// ───────────────────────────────────────────────────────────────
// Persisted position record
// ───────────────────────────────────────────────────────────────

/// Read a valve's persisted position.  Missing or corrupt records degrade
/// to `None` — the restore policy supplies the default.
pub fn load_position(storage: &impl StoragePort, key: &str) -> Option<bool> {
    let mut buf = [0u8; 8];
    match storage.read(VALVE_NAMESPACE, key, &mut buf) {
        Ok(n) => postcard::from_bytes::<bool>(&buf[..n]).ok(),
        Err(_) => None,
    }
}

/// Persist a valve's reached position.  Written once per completed
/// transition to minimise flash wear.
pub fn store_position(
    storage: &mut impl StoragePort,
    key: &str,
    open: bool,
) -> Result<(), StorageError> {
    let bytes = postcard::to_allocvec(&open).map_err(|_| StorageError::IoError)?;
    storage.write(VALVE_NAMESPACE, key, &bytes)
}

// ───────────────────────────────────────────────────────────────
// ZoneService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct ZoneService {
    fan: HBridgeFan,
    valves: heapless::Vec<ValveActuator, MAX_VALVES>,
    tick_count: u64,
}

impl ZoneService {
    /// Construct the service around a configured fan driver.
    ///
    /// Does **not** apply restore policies — add the valves, then call
    /// [`start`](Self::start).
    pub fn new(fan: HBridgeFan) -> Self {
        Self {
            fan,
            valves: heapless::Vec::new(),
            tick_count: 0,
        }
    }

    /// Register a valve instance.  Returns the slot index, or `None` if
    /// all [`MAX_VALVES`] slots are taken.
    pub fn add_valve(&mut self, valve: ValveActuator) -> Option<usize> {
        let key = valve.key();
        match self.valves.push(valve) {
            Ok(()) => {
                let slot = self.valves.len() - 1;
                info!("service: valve '{}' at slot {}", key, slot);
                Some(slot)
            }
            Err(_) => {
                warn!("service: valve slots full, '{}' not registered", key);
                None
            }
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Apply each valve's boot restore policy.
    ///
    /// Reads the persisted position once per instance and begins a full
    /// real transition toward the computed target — stored state is never
    /// trusted to match the physical position after a power cycle.
    pub fn start(
        &mut self,
        storage: &impl StoragePort,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        for valve in &mut self.valves {
            let persisted = load_position(storage, valve.key());
            let target = valve.restore(persisted, now_ms);
            sink.emit(&AppEvent::ValveTransitionStarted {
                key: valve.key(),
                opening: target,
            });
        }
        sink.emit(&AppEvent::Started);
        info!("ZoneService started ({} valves)", self.valves.len());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: advance every valve transition and persist
    /// any position reached this tick.
    pub fn tick(
        &mut self,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        self.tick_count += 1;

        for valve in &mut self.valves {
            let Some(open) = valve.tick(now_ms) else {
                continue;
            };
            let key = valve.key();
            if let Err(e) = store_position(storage, key, open) {
                warn!("service: persisting '{}' failed: {}", key, e);
                sink.emit(&AppEvent::ValvePersistFailed { key });
            }
            sink.emit(&AppEvent::ValvePositionReached { key, open });
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (wall panel, serial console, tests).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        match cmd {
            AppCommand::SetFan(state) => {
                self.fan.set_state(state);
                sink.emit(&AppEvent::FanStateChanged(state));
            }
            AppCommand::BrakeFan => {
                self.fan.brake();
                sink.emit(&AppEvent::FanBraked);
            }
            AppCommand::SetValve { key, open } => {
                match self.valves.iter_mut().find(|v| v.key() == key) {
                    Some(valve) => {
                        if valve.write_state(open, now_ms) {
                            sink.emit(&AppEvent::ValveTransitionStarted {
                                key,
                                opening: open,
                            });
                        }
                    }
                    None => warn!("service: unknown valve key '{}'", key),
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot of the whole drive stack.
    pub fn build_telemetry(&self) -> TelemetryData {
        let mut valves = heapless::Vec::new();
        for v in &self.valves {
            valves.push((v.key(), v.state())).ok();
        }
        TelemetryData {
            fan: self.fan.state(),
            fan_braking: self.fan.is_braking(),
            fan_drive: self.fan.current_drive(),
            valves,
            tick: self.tick_count,
        }
    }

    pub fn fan(&self) -> &HBridgeFan {
        &self.fan
    }

    pub fn valve(&self, key: &str) -> Option<&ValveActuator> {
        self.valves.iter().find(|v| v.key() == key)
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
