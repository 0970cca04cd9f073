//! Integration tests for the ZoneService → ValveActuator → persistence
//! pipeline: boot restore, timed transitions, reversal, and the
//! power-loss-mid-travel recovery path.

use crate::mock_hw::{MockNvs, RecordingSink, SharedPin};

use zonedrive::app::commands::AppCommand;
use zonedrive::app::service::{load_position, store_position, ZoneService};
use zonedrive::drivers::fan::HBridgeFan;
use zonedrive::drivers::hbridge::HBridge;
use zonedrive::drivers::valve::{RestoreMode, ValveActuator, ValveActuatorState};

const SWITCH_MS: u64 = 15_000;

struct ValvePins {
    a: SharedPin,
    b: SharedPin,
}

fn make_service(mode: RestoreMode) -> (ZoneService, ValvePins) {
    let fan_bridge = HBridge::new(
        Box::new(SharedPin::new()),
        Box::new(SharedPin::new()),
    );
    let fan = HBridgeFan::new(fan_bridge, 100);

    let a = SharedPin::new();
    let b = SharedPin::new();
    let bridge = HBridge::new(Box::new(a.clone()), Box::new(b.clone()));
    let valve = ValveActuator::new("zone_a", bridge, SWITCH_MS as u32, mode);

    let mut service = ZoneService::new(fan);
    assert_eq!(service.add_valve(valve), Some(0));
    (service, ValvePins { a, b })
}

// ── Boot restore → full transition → persistence ─────────────

#[test]
fn first_boot_restores_default_and_persists_on_completion() {
    let mut nvs = MockNvs::new();
    let mut sink = RecordingSink::new();
    let (mut service, pins) = make_service(RestoreMode::RestoreDefaultOff);

    service.start(&nvs, &mut sink, 0);

    // No record yet → default closed, driven as a real transition.
    assert_eq!(sink.transitions_started(), vec![("zone_a", false)]);
    assert!((pins.b.level() - 1.0).abs() < 1e-6, "driving toward closed");
    assert_eq!(load_position(&nvs, "zone_a"), None, "nothing persisted yet");

    // Mid-travel ticks do not complete or persist.
    service.tick(&mut nvs, &mut sink, SWITCH_MS / 2);
    assert!(sink.positions_reached().is_empty());

    // Completion: brake, settle, persist exactly once.
    service.tick(&mut nvs, &mut sink, SWITCH_MS);
    assert_eq!(sink.positions_reached(), vec![("zone_a", false)]);
    assert_eq!(load_position(&nvs, "zone_a"), Some(false));
    assert_eq!(
        service.valve("zone_a").unwrap().state(),
        ValveActuatorState::IdleClosed
    );
    assert_eq!(nvs.write_count, 1, "one flash write per completed transition");
}

#[test]
fn persisted_position_is_restored() {
    let mut nvs = MockNvs::new();
    store_position(&mut nvs, "zone_a", true).unwrap();

    let mut sink = RecordingSink::new();
    let (mut service, pins) = make_service(RestoreMode::RestoreDefaultOff);
    service.start(&nvs, &mut sink, 0);

    assert_eq!(sink.transitions_started(), vec![("zone_a", true)]);
    assert!((pins.a.level() - 1.0).abs() < 1e-6, "driving toward open");
}

#[test]
fn inverted_restore_flips_persisted_position() {
    let mut nvs = MockNvs::new();
    store_position(&mut nvs, "zone_a", true).unwrap();

    let mut sink = RecordingSink::new();
    let (mut service, _pins) = make_service(RestoreMode::RestoreInvertedDefaultOn);
    service.start(&nvs, &mut sink, 0);

    assert_eq!(sink.transitions_started(), vec![("zone_a", false)]);
}

#[test]
fn always_modes_ignore_persisted_record() {
    for (mode, expected) in [
        (RestoreMode::AlwaysOff, false),
        (RestoreMode::AlwaysOn, true),
    ] {
        let mut nvs = MockNvs::new();
        store_position(&mut nvs, "zone_a", !expected).unwrap();

        let mut sink = RecordingSink::new();
        let (mut service, _pins) = make_service(mode);
        service.start(&nvs, &mut sink, 0);
        assert_eq!(sink.transitions_started(), vec![("zone_a", expected)]);
    }
}

// ── Power loss mid-travel ─────────────────────────────────────

#[test]
fn power_loss_mid_transition_leaves_old_record_and_recovers_at_boot() {
    let mut nvs = MockNvs::new();

    // First life: boot, settle closed, then start opening and "lose power"
    // halfway — the record must still read the last COMPLETED position.
    {
        let mut sink = RecordingSink::new();
        let (mut service, _pins) = make_service(RestoreMode::RestoreDefaultOff);
        service.start(&nvs, &mut sink, 0);
        service.tick(&mut nvs, &mut sink, SWITCH_MS);
        assert_eq!(load_position(&nvs, "zone_a"), Some(false));

        service.handle_command(
            AppCommand::SetValve {
                key: "zone_a",
                open: true,
            },
            &mut sink,
            20_000,
        );
        service.tick(&mut nvs, &mut sink, 20_000 + SWITCH_MS / 3);
        // Dropped here: no completion, no persistence of the new target.
        assert_eq!(load_position(&nvs, "zone_a"), Some(false));
    }

    // Second life: restore drives a full transition back to the recorded
    // position even though the actuator was abandoned mid-travel.
    let mut sink = RecordingSink::new();
    let (mut service, pins) = make_service(RestoreMode::RestoreDefaultOff);
    service.start(&nvs, &mut sink, 0);
    assert_eq!(sink.transitions_started(), vec![("zone_a", false)]);
    assert!((pins.b.level() - 1.0).abs() < 1e-6);

    service.tick(&mut nvs, &mut sink, SWITCH_MS);
    assert_eq!(sink.positions_reached(), vec![("zone_a", false)]);
}

// ── Command dispatch ──────────────────────────────────────────

#[test]
fn set_valve_command_runs_full_cycle() {
    let mut nvs = MockNvs::new();
    let mut sink = RecordingSink::new();
    let (mut service, pins) = make_service(RestoreMode::RestoreDefaultOff);
    service.start(&nvs, &mut sink, 0);
    service.tick(&mut nvs, &mut sink, SWITCH_MS);

    service.handle_command(
        AppCommand::SetValve {
            key: "zone_a",
            open: true,
        },
        &mut sink,
        30_000,
    );
    assert!(service.valve("zone_a").unwrap().is_transitioning());
    assert!((pins.a.level() - 1.0).abs() < 1e-6);

    service.tick(&mut nvs, &mut sink, 30_000 + SWITCH_MS);
    assert_eq!(load_position(&nvs, "zone_a"), Some(true));
    assert_eq!(
        service.valve("zone_a").unwrap().state(),
        ValveActuatorState::IdleOpen
    );
    // Braked in place: both bridge pins high.
    assert!((pins.a.level() - 1.0).abs() < 1e-6);
    assert!((pins.b.level() - 1.0).abs() < 1e-6);
}

#[test]
fn matching_target_command_is_noop_and_skips_persistence() {
    let mut nvs = MockNvs::new();
    let mut sink = RecordingSink::new();
    let (mut service, pins) = make_service(RestoreMode::RestoreDefaultOff);
    service.start(&nvs, &mut sink, 0);
    service.tick(&mut nvs, &mut sink, SWITCH_MS);

    let writes_before = nvs.write_count;
    let pin_writes_before = pins.a.writes() + pins.b.writes();
    let transitions_before = sink.transitions_started().len();

    service.handle_command(
        AppCommand::SetValve {
            key: "zone_a",
            open: false,
        },
        &mut sink,
        40_000,
    );
    service.tick(&mut nvs, &mut sink, 60_000);

    assert_eq!(nvs.write_count, writes_before);
    assert_eq!(pins.a.writes() + pins.b.writes(), pin_writes_before);
    assert_eq!(sink.transitions_started().len(), transitions_before);
}

#[test]
fn opposite_command_mid_transition_reverses() {
    let mut nvs = MockNvs::new();
    let mut sink = RecordingSink::new();
    let (mut service, pins) = make_service(RestoreMode::RestoreDefaultOff);
    service.start(&nvs, &mut sink, 0);
    service.tick(&mut nvs, &mut sink, SWITCH_MS);

    service.handle_command(
        AppCommand::SetValve {
            key: "zone_a",
            open: true,
        },
        &mut sink,
        20_000,
    );
    // Reverse part-way through the opening travel.
    service.handle_command(
        AppCommand::SetValve {
            key: "zone_a",
            open: false,
        },
        &mut sink,
        25_000,
    );
    assert!((pins.b.level() - 1.0).abs() < 1e-6, "now driving closed");

    // The reversal gets a full switching time from the reversal point.
    service.tick(&mut nvs, &mut sink, 25_000 + SWITCH_MS - 1);
    assert!(service.valve("zone_a").unwrap().is_transitioning());
    service.tick(&mut nvs, &mut sink, 25_000 + SWITCH_MS);
    assert_eq!(load_position(&nvs, "zone_a"), Some(false));
}

#[test]
fn unknown_valve_key_is_ignored() {
    let mut nvs = MockNvs::new();
    let mut sink = RecordingSink::new();
    let (mut service, _pins) = make_service(RestoreMode::RestoreDefaultOff);
    service.start(&nvs, &mut sink, 0);

    let events_before = sink.events.len();
    service.handle_command(
        AppCommand::SetValve {
            key: "zone_x",
            open: true,
        },
        &mut sink,
        1_000,
    );
    assert_eq!(sink.events.len(), events_before);
    service.tick(&mut nvs, &mut sink, 2_000);
}

// ── Persistence faults ────────────────────────────────────────

#[test]
fn persist_failure_emits_event_but_valve_still_settles() {
    let mut nvs = MockNvs::new();
    nvs.fail_writes = true;

    let mut sink = RecordingSink::new();
    let (mut service, _pins) = make_service(RestoreMode::RestoreDefaultOn);
    service.start(&nvs, &mut sink, 0);
    service.tick(&mut nvs, &mut sink, SWITCH_MS);

    assert!(sink
        .events
        .iter()
        .any(|e| matches!(e, zonedrive::app::events::AppEvent::ValvePersistFailed { .. })));
    assert_eq!(
        service.valve("zone_a").unwrap().state(),
        ValveActuatorState::IdleOpen
    );
}

// ── Multiple instances ────────────────────────────────────────

#[test]
fn two_valves_persist_independently() {
    let fan_bridge = HBridge::new(
        Box::new(SharedPin::new()),
        Box::new(SharedPin::new()),
    );
    let mut service = ZoneService::new(HBridgeFan::new(fan_bridge, 100));

    for key in ["zone_a", "zone_b"] {
        let bridge = HBridge::new(
            Box::new(SharedPin::new()),
            Box::new(SharedPin::new()),
        );
        service.add_valve(ValveActuator::new(
            key,
            bridge,
            SWITCH_MS as u32,
            RestoreMode::RestoreDefaultOff,
        ));
    }

    let mut nvs = MockNvs::new();
    let mut sink = RecordingSink::new();
    service.start(&nvs, &mut sink, 0);
    service.tick(&mut nvs, &mut sink, SWITCH_MS);

    service.handle_command(
        AppCommand::SetValve {
            key: "zone_b",
            open: true,
        },
        &mut sink,
        30_000,
    );
    service.tick(&mut nvs, &mut sink, 30_000 + SWITCH_MS);

    assert_eq!(load_position(&nvs, "zone_a"), Some(false));
    assert_eq!(load_position(&nvs, "zone_b"), Some(true));
}
