//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (wall panel,
//! serial console, future bus adapters) that the
//! [`ZoneService`](super::service::ZoneService) interprets and acts upon.
//! Valve commands address an instance by its static key — the typed
//! equivalent of invoking an action on a named component.

use crate::drivers::fan::FanState;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Set the fan's target state (on/off, speed level, direction,
    /// oscillation).  Turning the fan off coasts; it does NOT brake.
    SetFan(FanState),

    /// Explicit fan brake: short the motor for a controlled stop.
    /// Physically distinct from `SetFan { on: false, .. }` (freewheel).
    BrakeFan,

    /// Command a valve actuator to its open (`true`) or closed (`false`)
    /// end state.  Unknown keys are ignored with a warning.
    SetValve { key: &'static str, open: bool },
}
