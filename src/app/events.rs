//! Outbound application events.
//!
//! The [`ZoneService`](super::service::ZoneService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, publish to a future
//! home-automation bus, etc.

use crate::drivers::fan::FanState;
use crate::drivers::valve::ValveActuatorState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The fan's commanded state changed.
    FanStateChanged(FanState),

    /// The fan brake action was triggered (controlled stop, not coast).
    FanBraked,

    /// A valve actuator began travelling toward an end state.
    ValveTransitionStarted { key: &'static str, opening: bool },

    /// A valve actuator completed its transition and was braked in place.
    ValvePositionReached { key: &'static str, open: bool },

    /// Persisting a completed valve position failed (transition still
    /// settled; the restore policy absorbs the stale record at next boot).
    ValvePersistFailed { key: &'static str },

    /// The application service has started.
    Started,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub fan: FanState,
    pub fan_braking: bool,
    pub fan_drive: i16,
    /// One entry per configured valve: (instance key, actuator state).
    pub valves: heapless::Vec<(&'static str, ValveActuatorState), 4>,
    pub tick: u64,
}
