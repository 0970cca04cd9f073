//! GPIO / peripheral pin assignments for the ZoneDrive main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Pin assignments match the schematic in `docs/engineering/zone-board.md`.

// ---------------------------------------------------------------------------
// Circulation fan H-bridge (DRV8871)
// ---------------------------------------------------------------------------

/// LEDC PWM output: fan bridge input A (forward duty).
pub const FAN_IN_A_GPIO: i32 = 1;
/// LEDC PWM output: fan bridge input B (reverse duty).
pub const FAN_IN_B_GPIO: i32 = 2;
/// Digital output: louvre oscillation motor relay (optional population).
pub const FAN_OSC_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Zone valve actuator H-bridge (L298-style, geared ball valve)
// ---------------------------------------------------------------------------

/// Digital output: valve bridge input A (drive toward OPEN).
pub const VALVE_A_IN_A_GPIO: i32 = 4;
/// Digital output: valve bridge input B (drive toward CLOSED).
pub const VALVE_A_IN_B_GPIO: i32 = 5;
/// Digital output: valve bridge enable (active HIGH, shared per bridge).
pub const VALVE_A_EN_GPIO: i32 = 6;

/// Second zone valve (unpopulated on single-zone boards).
pub const VALVE_B_IN_A_GPIO: i32 = 7;
pub const VALVE_B_IN_B_GPIO: i32 = 8;
pub const VALVE_B_EN_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the fan bridge (25 kHz — inaudible).
pub const FAN_PWM_FREQ_HZ: u32 = 25_000;

// ---------------------------------------------------------------------------
// UART debug
// ---------------------------------------------------------------------------

pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
