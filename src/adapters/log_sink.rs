//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future home-automation bus adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | fan on={} level={} {:?} osc={} braking={} drive={} | \
                     valves={:?} | tick={}",
                    t.fan.on,
                    t.fan.speed_level,
                    t.fan.direction,
                    t.fan.oscillating,
                    t.fan_braking,
                    t.fan_drive,
                    t.valves,
                    t.tick,
                );
            }
            AppEvent::FanStateChanged(state) => {
                info!(
                    "FAN   | on={} level={} {:?} osc={}",
                    state.on, state.speed_level, state.direction, state.oscillating
                );
            }
            AppEvent::FanBraked => {
                info!("FAN   | brake");
            }
            AppEvent::ValveTransitionStarted { key, opening } => {
                info!(
                    "VALVE | '{}' -> {}",
                    key,
                    if *opening { "open" } else { "closed" }
                );
            }
            AppEvent::ValvePositionReached { key, open } => {
                info!(
                    "VALVE | '{}' reached {}",
                    key,
                    if *open { "open" } else { "closed" }
                );
            }
            AppEvent::ValvePersistFailed { key } => {
                warn!("VALVE | '{}' position persist failed", key);
            }
            AppEvent::Started => {
                info!("START | zone service running");
            }
        }
    }
}
