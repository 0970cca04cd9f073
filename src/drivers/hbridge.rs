//! Shared H-bridge drive core.
//!
//! Turns a signed drive intent into a pair of complementary output-pin
//! levels.  Positive drive puts duty on pin A, negative on pin B, zero
//! releases both (coast).  Braking shorts the motor by driving both pins
//! high.  The core holds no timers and knows nothing about what is bolted
//! to the bridge — fan and valve semantics live in their own drivers.
//!
//! ```text
//!  drive > 0   A=|v|/max  B=0        (forward)
//!  drive < 0   A=0        B=|v|/max  (reverse)
//!  drive = 0   A=0        B=0        (coast — freewheel)
//!  brake       A=1        B=1        (short — controlled stop)
//! ```

use log::debug;

use crate::app::ports::OutputPin;

/// Full-scale drive magnitude.  `set_speed` accepts `[-MAX_DRIVE, MAX_DRIVE]`
/// and clamps anything outside.
pub const MAX_DRIVE: i16 = 1000;

/// Current decay behaviour between PWM pulses.
///
/// Fast decay releases the complementary pin; slow decay holds the active
/// pin solid and inverts the duty on the complementary pin, recirculating
/// the winding current (DRV8871 datasheet terminology).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decay {
    #[default]
    Fast,
    Slow,
}

pub struct HBridge {
    pin_a: Box<dyn OutputPin>,
    pin_b: Box<dyn OutputPin>,
    enable: Option<Box<dyn OutputPin>>,
    decay: Decay,
    drive: i16,
    braking: bool,
}

impl HBridge {
    pub fn new(pin_a: Box<dyn OutputPin>, pin_b: Box<dyn OutputPin>) -> Self {
        Self {
            pin_a,
            pin_b,
            enable: None,
            decay: Decay::Fast,
            drive: 0,
            braking: false,
        }
    }

    /// Attach an enable line (L298-style bridges).  Driven high while the
    /// bridge is actively driving or braking, low on coast.
    pub fn with_enable(mut self, enable: Box<dyn OutputPin>) -> Self {
        self.enable = Some(enable);
        self
    }

    pub fn with_decay(mut self, decay: Decay) -> Self {
        self.decay = decay;
        self
    }

    /// Drive the bridge at `value` in `[-MAX_DRIVE, MAX_DRIVE]`.
    ///
    /// Out-of-range values are clamped, never rejected.  Zero coasts: both
    /// pins released at 0% duty, which is NOT the same as braking.
    pub fn set_speed(&mut self, value: i16) {
        let value = value.clamp(-MAX_DRIVE, MAX_DRIVE);
        self.braking = false;
        self.drive = value;

        if value == 0 {
            self.pin_a.set_level(0.0);
            self.pin_b.set_level(0.0);
            if let Some(en) = self.enable.as_mut() {
                en.set_state(false);
            }
            debug!("hbridge: coast");
            return;
        }

        let duty = value.unsigned_abs() as f32 / MAX_DRIVE as f32;
        let (active_duty, complement_duty) = match self.decay {
            Decay::Fast => (duty, 0.0),
            Decay::Slow => (1.0, 1.0 - duty),
        };

        if value > 0 {
            self.pin_a.set_level(active_duty);
            self.pin_b.set_level(complement_duty);
        } else {
            self.pin_b.set_level(active_duty);
            self.pin_a.set_level(complement_duty);
        }
        if let Some(en) = self.enable.as_mut() {
            en.set_state(true);
        }
        debug!("hbridge: drive {} ({:.0}% duty)", value, duty * 100.0);
    }

    /// Short the motor windings for a controlled stop.
    ///
    /// Always yields the same pin pattern regardless of prior state, and
    /// clears any pending drive.  Idempotent.
    pub fn brake(&mut self) {
        self.pin_a.set_level(1.0);
        self.pin_b.set_level(1.0);
        if let Some(en) = self.enable.as_mut() {
            en.set_state(true);
        }
        self.drive = 0;
        self.braking = true;
        debug!("hbridge: brake");
    }

    /// Current signed drive value (0 while coasting or braking).
    pub fn current_drive(&self) -> i16 {
        self.drive
    }

    pub fn is_braking(&self) -> bool {
        self.braking
    }
}
