//! Zone valve actuator driver (H-bridge, geared ball valve).
//!
//! A binary-switch abstraction over a slow motorized actuator: commanding
//! a target end state drives the bridge at full scale for the configured
//! switching time, then brakes the motor to hold position — an unpowered
//! actuator can drift off its seat, so transitions always end in a brake,
//! never a coast.
//!
//! ```text
//!  IdleClosed ──write_state(true)──▶ TransitioningToOpen ──elapsed──▶ IdleOpen
//!      ▲                                                                 │
//!      └──elapsed── TransitioningToClosed ◀──write_state(false)──────────┘
//! ```
//!
//! The last reached position is persisted by the owner (one record per
//! instance key) and fed back through [`ValveActuator::restore`] at boot.
//! Restore always runs a full real transition: power may have been lost
//! mid-travel, so the stored position is a hint, not ground truth.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::drivers::hbridge::{HBridge, MAX_DRIVE};

// ───────────────────────────────────────────────────────────────
// Restore policy
// ───────────────────────────────────────────────────────────────

/// Boot-time policy deciding the initial commanded position from the
/// (possibly absent, possibly stale) persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RestoreMode {
    /// Restore the persisted position; closed when no record exists.
    #[default]
    RestoreDefaultOff,
    /// Restore the persisted position; open when no record exists.
    RestoreDefaultOn,
    /// Always start closed, ignoring any record.
    AlwaysOff,
    /// Always start open, ignoring any record.
    AlwaysOn,
    /// Restore the inverse of the persisted position; closed when no
    /// record exists.
    RestoreInvertedDefaultOff,
    /// Restore the inverse of the persisted position; open when no
    /// record exists.
    RestoreInvertedDefaultOn,
}

impl RestoreMode {
    /// The initial target position (`true` = open) given the persisted
    /// record read at boot.
    pub fn initial_target(self, persisted: Option<bool>) -> bool {
        match self {
            Self::RestoreDefaultOff => persisted.unwrap_or(false),
            Self::RestoreDefaultOn => persisted.unwrap_or(true),
            Self::AlwaysOff => false,
            Self::AlwaysOn => true,
            Self::RestoreInvertedDefaultOff => !persisted.unwrap_or(true),
            Self::RestoreInvertedDefaultOn => !persisted.unwrap_or(false),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator state machine
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveActuatorState {
    IdleOpen,
    IdleClosed,
    TransitioningToOpen { since_ms: u64 },
    TransitioningToClosed { since_ms: u64 },
}

impl ValveActuatorState {
    /// The position this state is at or travelling toward.
    pub fn target(self) -> bool {
        matches!(
            self,
            Self::IdleOpen | Self::TransitioningToOpen { .. }
        )
    }

    pub fn is_transitioning(self) -> bool {
        matches!(
            self,
            Self::TransitioningToOpen { .. } | Self::TransitioningToClosed { .. }
        )
    }
}

pub struct ValveActuator {
    /// Instance key — also the NVS key of the persisted position record.
    key: &'static str,
    bridge: HBridge,
    /// Full end-to-end travel time.  Config-time validated to be positive.
    switching_time_ms: u32,
    restore_mode: RestoreMode,
    state: ValveActuatorState,
}

impl ValveActuator {
    pub fn new(
        key: &'static str,
        bridge: HBridge,
        switching_time_ms: u32,
        restore_mode: RestoreMode,
    ) -> Self {
        Self {
            key,
            bridge,
            switching_time_ms,
            restore_mode,
            // Software default until restore() commands the boot transition;
            // the physical position is unknown at this point.
            state: ValveActuatorState::IdleClosed,
        }
    }

    /// Apply the boot restore policy.
    ///
    /// Unconditionally begins a full transition toward the computed target
    /// — the actuator's physical position is not assumed to match any
    /// stored software state until a complete transition has run.
    /// Returns the chosen target.
    pub fn restore(&mut self, persisted: Option<bool>, now_ms: u64) -> bool {
        let target = self.restore_mode.initial_target(persisted);
        info!(
            "valve '{}': restore {:?} persisted={:?} -> {}",
            self.key,
            self.restore_mode,
            persisted,
            position_name(target)
        );
        self.begin_transition(target, now_ms);
        target
    }

    /// Command the actuator toward `target` (`true` = open).
    ///
    /// A no-op when the idle state already matches or when already
    /// travelling toward the same target (no pin writes).  An opposite
    /// target mid-transition aborts and reverses immediately, restarting
    /// the full switching timer — the mid-travel position is unknown, so
    /// the whole duration is driven.
    ///
    /// Returns `true` when a transition was started.
    pub fn write_state(&mut self, target: bool, now_ms: u64) -> bool {
        if self.state.target() == target {
            debug!("valve '{}': already {}", self.key, position_name(target));
            return false;
        }
        if self.state.is_transitioning() {
            info!("valve '{}': reversing mid-transition", self.key);
        }
        self.begin_transition(target, now_ms);
        true
    }

    /// Periodic update.  While transitioning, checks elapsed travel time;
    /// on completion brakes the motor, settles into the idle state, and
    /// returns the reached position for the owner to persist.
    pub fn tick(&mut self, now_ms: u64) -> Option<bool> {
        let (since_ms, opening) = match self.state {
            ValveActuatorState::TransitioningToOpen { since_ms } => (since_ms, true),
            ValveActuatorState::TransitioningToClosed { since_ms } => (since_ms, false),
            _ => return None,
        };

        if now_ms.saturating_sub(since_ms) < u64::from(self.switching_time_ms) {
            return None;
        }

        // Hold the actuator firmly at the end stop.
        self.bridge.brake();
        self.state = if opening {
            ValveActuatorState::IdleOpen
        } else {
            ValveActuatorState::IdleClosed
        };
        info!("valve '{}': reached {}", self.key, position_name(opening));
        Some(opening)
    }

    fn begin_transition(&mut self, open: bool, now_ms: u64) {
        self.state = if open {
            ValveActuatorState::TransitioningToOpen { since_ms: now_ms }
        } else {
            ValveActuatorState::TransitioningToClosed { since_ms: now_ms }
        };
        self.bridge
            .set_speed(if open { MAX_DRIVE } else { -MAX_DRIVE });
        info!("valve '{}': driving {}", self.key, position_name(open));
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn state(&self) -> ValveActuatorState {
        self.state
    }

    /// Binary-switch query: the position the valve is at or moving toward.
    pub fn is_state(&self) -> bool {
        self.state.target()
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning()
    }

    pub fn restore_mode(&self) -> RestoreMode {
        self.restore_mode
    }
}

fn position_name(open: bool) -> &'static str {
    if open { "open" } else { "closed" }
}
