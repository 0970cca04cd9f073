//! Output pin capability implementations.
//!
//! Everything the drive stack writes goes through the
//! [`OutputPin`](crate::app::ports::OutputPin) port.  This module provides
//! the concrete handles for the ZoneDrive board plus adapters for any
//! `embedded-hal` 1.0 pin, so the same drivers run against other HALs.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes real LEDC duty / GPIO levels via hw_init helpers.
//! On host/test: tracks the last written level in-memory only.

use embedded_hal::{digital, pwm};

use crate::app::ports::OutputPin;
use crate::drivers::hw_init;

// ── LEDC PWM channel ──────────────────────────────────────────

/// An LEDC PWM channel driven as an analog-level output.
pub struct LedcPin {
    channel: u32,
    level: f32,
}

impl LedcPin {
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            level: 0.0,
        }
    }

    /// Last written level (duty fraction).
    pub fn current_level(&self) -> f32 {
        self.level
    }
}

impl OutputPin for LedcPin {
    fn set_level(&mut self, level: f32) {
        let level = level.clamp(0.0, 1.0);
        let duty_8bit = (level * 255.0).round() as u8;
        hw_init::ledc_set(self.channel, duty_8bit);
        self.level = level;
    }
}

// ── Plain GPIO ────────────────────────────────────────────────

/// A digital GPIO driven as a binary output.  Analog levels are
/// thresholded at 0.5, so a full-duty bridge drive maps to logic HIGH.
pub struct GpioPin {
    pin: i32,
    high: bool,
}

impl GpioPin {
    pub fn new(pin: i32) -> Self {
        Self { pin, high: false }
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

impl OutputPin for GpioPin {
    fn set_level(&mut self, level: f32) {
        let high = level >= 0.5;
        hw_init::gpio_write(self.pin, high);
        self.high = high;
    }
}

// ── embedded-hal adapters ─────────────────────────────────────

/// Adapter exposing any `embedded-hal` PWM channel as an [`OutputPin`].
pub struct PwmOutput<T: pwm::SetDutyCycle> {
    inner: T,
}

impl<T: pwm::SetDutyCycle> PwmOutput<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: pwm::SetDutyCycle> OutputPin for PwmOutput<T> {
    fn set_level(&mut self, level: f32) {
        let level = level.clamp(0.0, 1.0);
        let max = self.inner.max_duty_cycle();
        let duty = (level * max as f32).round() as u16;
        // Pin writes are fire-and-forget; a failed HAL write has no
        // recovery path at this layer.
        self.inner.set_duty_cycle(duty).ok();
    }
}

/// Adapter exposing any `embedded-hal` push-pull output as an [`OutputPin`].
pub struct DigitalOutput<T: digital::OutputPin> {
    inner: T,
}

impl<T: digital::OutputPin> DigitalOutput<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: digital::OutputPin> OutputPin for DigitalOutput<T> {
    fn set_level(&mut self, level: f32) {
        if level >= 0.5 {
            self.inner.set_high().ok();
        } else {
            self.inner.set_low().ok();
        }
    }
}

// ── Test double ───────────────────────────────────────────────
