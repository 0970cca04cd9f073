//! ZoneDrive Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single periodic control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  LedcPin / GpioPin   LogEventSink   NvsAdapter   Esp32Time     │
//! │  (OutputPin)         (EventSink)    (Config+NVS) (monotonic)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ZoneService (pure logic)                  │    │
//! │  │  HBridgeFan · ValveActuators · Restore policy          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod pins;

pub mod app;
mod adapters;
mod drivers;

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{info, warn};

use adapters::log_sink::LogEventSink;
use adapters::nvs::NvsAdapter;
use adapters::time::Esp32TimeAdapter;
use app::events::AppEvent;
use app::ports::ConfigPort;
use app::ports::EventSink;
use app::service::ZoneService;
use config::SystemConfig;
use drivers::fan::HBridgeFan;
use drivers::hbridge::HBridge;
use drivers::hw_init::{LEDC_CH_FAN_A, LEDC_CH_FAN_B};
use drivers::output::{GpioPin, LedcPin};
use drivers::valve::ValveActuator;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  ZoneDrive v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        log::error!("HAL init failed: {} — halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let watchdog = drivers::watchdog::Watchdog::new();

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let mut nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            // Continue without NVS — valve positions will not persist this
            // session.  On next reboot, NVS should self-heal.
            NvsAdapter::default()
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    let time_adapter = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 4. Construct the drive stack ──────────────────────────
    let fan_bridge = HBridge::new(
        Box::new(LedcPin::new(LEDC_CH_FAN_A)),
        Box::new(LedcPin::new(LEDC_CH_FAN_B)),
    );
    let fan = HBridgeFan::new(fan_bridge, config.fan_speed_count)
        .with_oscillation(Box::new(GpioPin::new(pins::FAN_OSC_GPIO)));

    let valve_bridge = HBridge::new(
        Box::new(GpioPin::new(pins::VALVE_A_IN_A_GPIO)),
        Box::new(GpioPin::new(pins::VALVE_A_IN_B_GPIO)),
    )
    .with_enable(Box::new(GpioPin::new(pins::VALVE_A_EN_GPIO)));
    let valve = ValveActuator::new(
        "zone_a",
        valve_bridge,
        config.valve_switching_time_ms,
        config.valve_restore_mode,
    );

    let mut service = ZoneService::new(fan);
    service.add_valve(valve);

    // ── 5. Boot restore — drives each valve to its policy target ──
    service.start(&nvs, &mut log_sink, time_adapter.uptime_ms());

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    let loop_ms = u64::from(config.control_loop_interval_ms);
    let ticks_per_telemetry =
        (u64::from(config.telemetry_interval_secs) * 1000 / loop_ms).max(1);
    let mut telemetry_counter: u64 = 0;

    loop {
        // On ESP-IDF std sleep maps to vTaskDelay, yielding to FreeRTOS.
        std::thread::sleep(std::time::Duration::from_millis(loop_ms));

        let now_ms = time_adapter.uptime_ms();
        service.tick(&mut nvs, &mut log_sink, now_ms);

        telemetry_counter += 1;
        if telemetry_counter >= ticks_per_telemetry {
            log_sink.emit(&AppEvent::Telemetry(service.build_telemetry()));
            telemetry_counter = 0;
        }

        // Feed watchdog on every iteration.
        watchdog.feed();
    }
}
