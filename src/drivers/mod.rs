//! Drive-stack drivers, hardware initialisation, and peripheral helpers.

pub mod fan;
pub mod hbridge;
pub mod hw_init;
pub mod output;
pub mod valve;
pub mod watchdog;
