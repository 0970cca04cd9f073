//! Circulation fan driver (H-bridge, quantized speed steps).
//!
//! Maps the fan abstraction (on/off, speed level, direction, oscillation)
//! onto the shared [`HBridge`] core.  Speed levels are quantized into
//! `speed_count` discrete steps and scaled to the signed drive range.
//!
//! Turning the fan off coasts the motor (freewheel).  The explicit
//! [`brake`](HBridgeFan::brake) action shorts the windings instead — a
//! physically different stop, so it is a separate command rather than a
//! flavour of "off".

use log::{debug, info};

use crate::app::ports::OutputPin;
use crate::drivers::hbridge::{HBridge, MAX_DRIVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanDirection {
    #[default]
    Forward,
    Reverse,
}

/// Target state commanded by the automation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FanState {
    pub on: bool,
    /// Speed step in `[0, speed_count]`; values above the configured
    /// count are clamped.
    pub speed_level: u16,
    pub oscillating: bool,
    pub direction: FanDirection,
}

pub struct HBridgeFan {
    bridge: HBridge,
    /// Number of discrete speed steps.  Config-time validated to be ≥ 1.
    speed_count: u16,
    oscillation: Option<Box<dyn OutputPin>>,
    state: FanState,
}

impl HBridgeFan {
    pub fn new(bridge: HBridge, speed_count: u16) -> Self {
        Self {
            bridge,
            speed_count,
            oscillation: None,
            state: FanState::default(),
        }
    }

    /// Attach the oscillation output (louvre motor relay).
    pub fn with_oscillation(mut self, pin: Box<dyn OutputPin>) -> Self {
        self.oscillation = Some(pin);
        self
    }

    /// Apply a new target state.  Called whenever the fan's commanded
    /// state changes, not per tick.
    pub fn set_state(&mut self, state: FanState) {
        self.state = state;

        // Oscillation output tracks the flag independently of the drive.
        if let Some(osc) = self.oscillation.as_mut() {
            osc.set_state(state.oscillating);
        }

        if !state.on || state.speed_level == 0 {
            // Coast to stop — braking is a separate, explicit action.
            self.bridge.set_speed(0);
            debug!("fan: off (coast)");
            return;
        }

        let level = state.speed_level.min(self.speed_count);
        let magnitude =
            (level as f32 / self.speed_count as f32 * MAX_DRIVE as f32).round() as i16;
        let drive = match state.direction {
            FanDirection::Forward => magnitude,
            FanDirection::Reverse => -magnitude,
        };
        self.bridge.set_speed(drive);
        debug!(
            "fan: level {}/{} {:?} -> drive {}",
            level, self.speed_count, state.direction, drive
        );
    }

    /// Short the motor for a controlled stop.  The commanded state is
    /// marked off so a later `set_state(on: true, ..)` re-drives cleanly.
    pub fn brake(&mut self) {
        self.bridge.brake();
        self.state.on = false;
        info!("fan: brake engaged");
    }

    pub fn state(&self) -> FanState {
        self.state
    }

    pub fn is_braking(&self) -> bool {
        self.bridge.is_braking()
    }

    pub fn current_drive(&self) -> i16 {
        self.bridge.current_drive()
    }

    pub fn speed_count(&self) -> u16 {
        self.speed_count
    }
}
