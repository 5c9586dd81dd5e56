//! Relay and LED drivers, hardware initialisation, and the watchdog.

pub mod heater;
pub mod hw_init;
pub mod status_led;
pub mod watchdog;
