//! Heartbeat LED driver.
//!
//! The on-board LED toggles once per control tick so a stalled loop is
//! visible at a glance.
//!
//! On ESP-IDF: drives the GPIO configured by hw_init.
//! On host/test: the write lands in the simulated pin table.

use crate::drivers::hw_init;
use crate::pins;

pub struct HeartbeatLed {
    pin: i32,
}

impl HeartbeatLed {
    pub fn new() -> Self {
        Self { pin: pins::HEARTBEAT_LED_GPIO }
    }

    pub fn set(&mut self, lit: bool) {
        hw_init::gpio_write(self.pin, lit);
    }
}

impl Default for HeartbeatLed {
    fn default() -> Self {
        Self::new()
    }
}
